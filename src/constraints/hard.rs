//! Hard-rule evaluation over staff rows and day columns.

use super::{Violation, ViolationKind};
use crate::csp::{Assignment, RosterProblem, Var};

/// Whether a day can still reach `min_staff`: assigned plus unassigned
/// open cells.
pub(super) fn day_can_reach_minimum(
    problem: &RosterProblem,
    assignment: &Assignment,
    day: usize,
    min_staff: usize,
) -> bool {
    let reachable = (0..problem.staff_count())
        .filter(|&s| match assignment.get(Var::new(s, day)) {
            Some(v) => v,
            None => problem.is_available(s, day),
        })
        .count();
    reachable >= min_staff
}

/// Longest run of `Some(true)` cells in a staff row.
pub(super) fn longest_run(assignment: &Assignment, staff: usize) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for cell in assignment.row(staff) {
        if *cell == Some(true) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Fewest free days between two consecutive assigned days, if the staff
/// member works at least twice.
pub(super) fn shortest_rest(assignment: &Assignment, staff: usize) -> Option<usize> {
    let mut last: Option<usize> = None;
    let mut shortest: Option<usize> = None;
    for (day, cell) in assignment.row(staff).iter().enumerate() {
        if *cell != Some(true) {
            continue;
        }
        if let Some(prev) = last {
            let rest = day - prev - 1;
            shortest = Some(shortest.map_or(rest, |s| s.min(rest)));
        }
        last = Some(day);
    }
    shortest
}

/// Required specialties on a day: the target capped by what is available.
pub(super) fn required_specialties(problem: &RosterProblem, day: usize, target: usize) -> usize {
    target.min(problem.available_specialty_count(day))
}

/// Whether a day can still cover the required specialties.
pub(super) fn day_can_cover_specialties(
    problem: &RosterProblem,
    assignment: &Assignment,
    day: usize,
    target: usize,
) -> bool {
    let mut possible = vec![false; problem.specialties().len()];
    for s in 0..problem.staff_count() {
        let could_work = match assignment.get(Var::new(s, day)) {
            Some(v) => v,
            None => problem.is_available(s, day),
        };
        if could_work {
            possible[problem.specialty_of(s)] = true;
        }
    }
    let reachable = possible.iter().filter(|&&p| p).count();
    reachable >= required_specialties(problem, day, target)
}

fn covered_specialties(problem: &RosterProblem, assignment: &Assignment, day: usize) -> usize {
    let mut covered = vec![false; problem.specialties().len()];
    for s in assignment.working_staff(day) {
        covered[problem.specialty_of(s)] = true;
    }
    covered.iter().filter(|&&c| c).count()
}

fn date_label(problem: &RosterProblem, day: usize) -> String {
    problem.days()[day].date.format("%Y-%m-%d").to_string()
}

pub(super) fn understaffed_days(
    problem: &RosterProblem,
    assignment: &Assignment,
    min_staff: usize,
) -> Vec<Violation> {
    (0..problem.day_count())
        .filter_map(|d| {
            let count = assignment.coverage(d);
            (count < min_staff).then(|| {
                Violation::new(
                    ViolationKind::Understaffed,
                    "minimum_staff",
                    date_label(problem, d),
                    format!("{count} staff assigned, {min_staff} required"),
                )
            })
        })
        .collect()
}

pub(super) fn overlong_runs(
    problem: &RosterProblem,
    assignment: &Assignment,
    max_days: usize,
) -> Vec<Violation> {
    (0..problem.staff_count())
        .filter_map(|s| {
            let run = longest_run(assignment, s);
            (run > max_days).then(|| {
                Violation::new(
                    ViolationKind::ConsecutiveDaysExceeded,
                    "max_consecutive_days",
                    problem.staff()[s].name.clone(),
                    format!("works {run} consecutive days, at most {max_days} allowed"),
                )
            })
        })
        .collect()
}

pub(super) fn short_rests(
    problem: &RosterProblem,
    assignment: &Assignment,
    min_rest_days: usize,
) -> Vec<Violation> {
    (0..problem.staff_count())
        .filter_map(|s| {
            let rest = shortest_rest(assignment, s)?;
            (rest < min_rest_days).then(|| {
                Violation::new(
                    ViolationKind::InsufficientRest,
                    "min_rest_period",
                    problem.staff()[s].name.clone(),
                    format!("{rest} rest days between shifts, {min_rest_days} required"),
                )
            })
        })
        .collect()
}

pub(super) fn specialty_gaps(
    problem: &RosterProblem,
    assignment: &Assignment,
    target: usize,
) -> Vec<Violation> {
    (0..problem.day_count())
        .filter_map(|d| {
            let covered = covered_specialties(problem, assignment, d);
            let required = required_specialties(problem, d, target);
            (covered < required).then(|| {
                Violation::new(
                    ViolationKind::SpecialtyGap,
                    "specialty_coverage",
                    date_label(problem, d),
                    format!("{covered} specialties covered, {required} required"),
                )
            })
        })
        .collect()
}
