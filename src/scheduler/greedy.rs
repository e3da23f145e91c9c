//! Greedy fair-distribution solver.
//!
//! # Algorithm
//!
//! Days are processed in order. For each day:
//! 1. Rank available staff by days worked so far (stable, pool order
//!    breaks ties).
//! 2. If at least as many staff are available as there are specialties
//!    in the pool, group them by specialty and take the least-loaded
//!    member of each group while below the minimum. Groups are visited
//!    by their least-loaded member's workload, then from the smallest
//!    group up.
//! 3. Fill remaining slots by lowest workload.
//! 4. Update workloads before the next day.
//!
//! Only MinimumStaff and availability are considered. The solver never
//! fails; days with too few available staff stay understaffed.
//!
//! # Complexity
//! O(d · n log n) for d days and n staff.

use std::time::Instant;

use tracing::{debug, info};

use crate::csp::{Assignment, RosterProblem, Var};

/// Greedy solver. Deterministic for a given problem.
#[derive(Debug, Clone, Copy)]
pub struct GreedySolver {
    min_staff: usize,
}

impl GreedySolver {
    /// Creates a solver filling `min_staff` slots per day.
    pub fn new(min_staff: usize) -> Self {
        Self { min_staff }
    }

    /// Builds a complete assignment.
    pub fn solve(&self, problem: &RosterProblem) -> Assignment {
        let staff_count = problem.staff_count();
        let mut assignment = Assignment::all_off(staff_count, problem.day_count());
        let mut workload = vec![0usize; staff_count];
        let specialty_total = problem.specialties().len();
        let started = Instant::now();
        info!(
            event = "solve_start",
            solver = "greedy",
            variables = problem.open_slots(),
            min_staff = self.min_staff,
        );

        for day in 0..problem.day_count() {
            let mut available = problem.available_staff(day);
            available.sort_by_key(|&s| workload[s]);

            let selected = if available.len() >= specialty_total {
                self.select_by_specialty(problem, &available, &workload)
            } else {
                available.iter().copied().take(self.min_staff).collect()
            };

            for &s in &selected {
                assignment.set(Var::new(s, day), true);
                workload[s] += 1;
            }
            debug!(
                event = "greedy_day",
                day,
                available = available.len(),
                selected = selected.len(),
            );
        }
        info!(
            event = "solve_end",
            solver = "greedy",
            elapsed_ms = started.elapsed().as_millis() as u64,
            assigned = assignment.assigned_slots(),
        );
        assignment
    }

    fn select_by_specialty(
        &self,
        problem: &RosterProblem,
        ranked: &[usize],
        workload: &[usize],
    ) -> Vec<usize> {
        // Groups in first-appearance order of the ranked list
        let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
        for &s in ranked {
            let sp = problem.specialty_of(s);
            match groups.iter_mut().find(|(g, _)| *g == sp) {
                Some((_, members)) => members.push(s),
                None => groups.push((sp, vec![s])),
            }
        }
        groups.sort_by_key(|(_, members)| {
            let lightest = members.iter().map(|&s| workload[s]).min().unwrap_or(0);
            (lightest, members.len())
        });

        let mut selected = Vec::with_capacity(self.min_staff);
        for (_, members) in &groups {
            if selected.len() >= self.min_staff {
                break;
            }
            if let Some(&best) = members.iter().min_by_key(|&&s| workload[s]) {
                selected.push(best);
            }
        }

        for &s in ranked {
            if selected.len() >= self.min_staff {
                break;
            }
            if !selected.contains(&s) {
                selected.push(s);
            }
        }
        selected
    }
}
