//! Soft-rule penalties. Unassigned cells count as not working.

use crate::csp::{Assignment, RosterProblem};

/// Population variance.
pub(crate) fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

pub(super) fn fair_workload(assignment: &Assignment, weight: f64, tolerance: f64) -> f64 {
    let loads: Vec<f64> = assignment.workloads().into_iter().map(|w| w as f64).collect();
    let var = variance(&loads);
    if var > tolerance {
        weight * (var - tolerance)
    } else {
        0.0
    }
}

pub(super) fn weekend_preference(
    problem: &RosterProblem,
    assignment: &Assignment,
    weight: f64,
    aversion: &[f64],
) -> f64 {
    let mut total = 0.0;
    for (d, day) in problem.days().iter().enumerate() {
        if !day.is_weekend {
            continue;
        }
        for s in assignment.working_staff(d) {
            total += aversion.get(s).copied().unwrap_or(0.0);
        }
    }
    weight * total
}

pub(super) fn holiday_distribution(
    problem: &RosterProblem,
    assignment: &Assignment,
    weight: f64,
    historical: &[u32],
) -> f64 {
    let totals: Vec<f64> = (0..problem.staff_count())
        .map(|s| {
            let current = problem
                .days()
                .iter()
                .enumerate()
                .filter(|(d, day)| day.is_holiday && assignment.works(s, *d))
                .count();
            (historical.get(s).copied().unwrap_or(0) as usize + current) as f64
        })
        .collect();
    weight * variance(&totals)
}

pub(super) fn team_preference(assignment: &Assignment, weight: f64, preferred: &[Vec<usize>]) -> f64 {
    let mut missing = 0usize;
    for d in 0..assignment.day_count() {
        for s in assignment.working_staff(d) {
            let Some(mates) = preferred.get(s) else {
                continue;
            };
            missing += mates.iter().filter(|&&m| !assignment.works(m, d)).count();
        }
    }
    weight * missing as f64
}
