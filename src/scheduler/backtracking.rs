//! Depth-first backtracking search.
//!
//! # Algorithm
//!
//! 1. Pre-assign 0 to every variable whose domain is {0} (leave days).
//! 2. Pick the next variable by minimum remaining values.
//! 3. Try its values in order (1 before 0), keep the first that leaves
//!    the assignment consistent, recurse, undo on failure.
//!
//! The first complete consistent assignment is accepted. Soft penalties
//! play no part. Limits are polled at every node.
//!
//! # Reference
//! Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", Ch. 6.3

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{LimitMonitor, SearchLimits, SolveOutcome};
use crate::csp::{Assignment, RosterCsp};

/// How a backtracking search ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// A complete consistent assignment was found.
    Solved,
    /// Every branch was explored without success.
    Exhausted,
    /// A search limit stopped the search.
    LimitReached(String),
}

/// Diagnostics of one backtracking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktrackStats {
    /// Search nodes visited.
    pub iterations: u64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// How the search ended.
    pub termination: Termination,
}

enum Search {
    Found,
    DeadEnd,
    Stopped(String),
}

/// Backtracking solver.
#[derive(Debug, Clone, Default)]
pub struct BacktrackingSolver {
    limits: SearchLimits,
}

impl BacktrackingSolver {
    /// Creates a solver with the given limits.
    pub fn new(limits: SearchLimits) -> Self {
        Self { limits }
    }

    /// Limits in use.
    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Searches for the first consistent complete assignment.
    pub fn solve(&self, csp: &RosterCsp) -> (SolveOutcome, BacktrackStats) {
        let mut monitor = self.limits.start();
        let mut assignment = csp.empty_assignment();
        let problem = csp.problem();
        for var in assignment.vars().collect::<Vec<_>>() {
            if !problem.domain(var).allows_work() {
                assignment.set(var, false);
            }
        }
        info!(
            event = "solve_start",
            solver = "backtracking",
            variables = problem.open_slots(),
            max_iterations = self.limits.max_iterations,
        );

        let termination = if !csp.is_consistent(&assignment) {
            Termination::Exhausted
        } else {
            match Self::search(csp, &mut assignment, &mut monitor) {
                Search::Found => Termination::Solved,
                Search::DeadEnd => Termination::Exhausted,
                Search::Stopped(reason) => Termination::LimitReached(reason),
            }
        };

        let stats = BacktrackStats {
            iterations: monitor.iterations(),
            elapsed: monitor.elapsed(),
            termination,
        };
        info!(
            event = "solve_end",
            solver = "backtracking",
            iterations = stats.iterations,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            termination = ?stats.termination,
        );

        let outcome = match &stats.termination {
            Termination::Solved => SolveOutcome::Solved(assignment),
            Termination::Exhausted => SolveOutcome::Infeasible,
            Termination::LimitReached(reason) => SolveOutcome::Failed {
                reason: reason.clone(),
            },
        };
        (outcome, stats)
    }

    fn search(csp: &RosterCsp, assignment: &mut Assignment, monitor: &mut LimitMonitor<'_>) -> Search {
        if let Some(reason) = monitor.step() {
            debug!(event = "search_cutoff", reason = %reason);
            return Search::Stopped(reason);
        }
        let Some(var) = csp.select_unassigned_variable(assignment) else {
            return Search::Found;
        };
        for &value in csp.order_domain_values(var) {
            assignment.set(var, value);
            if csp.is_consistent_at(assignment, var) {
                match Self::search(csp, assignment, monitor) {
                    Search::DeadEnd => {}
                    done => return done,
                }
            }
            assignment.unset(var);
        }
        Search::DeadEnd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoftWeights;
    use crate::csp::RosterProblem;
    use crate::models::{Availability, LeaveInterval, RosterCalendar, RosterRules, Staff};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn make_csp(staff: Vec<Staff>, rules: &RosterRules) -> RosterCsp {
        let days = RosterCalendar::plain(rules.roster_start, rules.roster_end).into_days();
        RosterCsp::from_rules(RosterProblem::new(staff, days), rules, &SoftWeights::default())
    }

    fn make_staff() -> Vec<Staff> {
        vec![
            Staff::new("A", "Cardiology"),
            Staff::new("B", "Cardiology"),
            Staff::new("C", "Surgery"),
        ]
    }

    #[test]
    fn test_solves_small_roster() {
        // One surgeon cannot cover every day within a 3-day run limit
        let rules = RosterRules::new(2, d(3), d(9))
            .with_max_consecutive_days(3)
            .with_min_specialties_per_day(1);
        let csp = make_csp(make_staff(), &rules);
        let (outcome, stats) = BacktrackingSolver::default().solve(&csp);
        assert_eq!(stats.termination, Termination::Solved);
        assert!(stats.iterations > 0);
        match outcome {
            SolveOutcome::Solved(a) => {
                assert!(a.is_complete());
                assert!(csp.is_consistent(&a));
                assert!(csp.violations(&a).is_empty());
            }
            other => panic!("expected Solved, got {other:?}"),
        }
    }

    #[test]
    fn test_single_staff_run_limit_is_infeasible() {
        let rules = RosterRules::new(1, d(3), d(7)).with_max_consecutive_days(2);
        let csp = make_csp(vec![Staff::new("A", "Cardiology")], &rules);
        let (outcome, stats) = BacktrackingSolver::default().solve(&csp);
        assert_eq!(outcome, SolveOutcome::Infeasible);
        assert_eq!(stats.termination, Termination::Exhausted);
    }

    #[test]
    fn test_leave_day_with_no_cover_is_infeasible_at_once() {
        let rules = RosterRules::new(1, d(3), d(5));
        let mut csp = make_csp(vec![Staff::new("A", "X")], &rules);
        csp.initialize_domains(&Availability::from_leave(&[LeaveInterval::single_day("A", d(4))]));
        let (outcome, stats) = BacktrackingSolver::default().solve(&csp);
        assert_eq!(outcome, SolveOutcome::Infeasible);
        assert_eq!(stats.iterations, 0);
    }

    #[test]
    fn test_respects_leave() {
        let rules = RosterRules::new(1, d(3), d(9));
        let mut csp = make_csp(make_staff(), &rules);
        csp.initialize_domains(&Availability::from_leave(&[LeaveInterval::new("A", d(3), d(6))]));
        let (outcome, _) = BacktrackingSolver::default().solve(&csp);
        let SolveOutcome::Solved(a) = outcome else {
            panic!("expected a solution");
        };
        for day in 0..4 {
            assert!(!a.works(0, day));
        }
    }

    #[test]
    fn test_iteration_cutoff() {
        let rules = RosterRules::new(2, d(3), d(9)).with_min_specialties_per_day(1);
        let csp = make_csp(make_staff(), &rules);
        let solver = BacktrackingSolver::new(SearchLimits::new(3, Duration::from_secs(60)));
        let (outcome, stats) = solver.solve(&csp);
        assert!(matches!(outcome, SolveOutcome::Failed { .. }));
        assert!(matches!(stats.termination, Termination::LimitReached(_)));
        assert_eq!(stats.iterations, 4);
    }
}
