//! Roster quality statistics.
//!
//! Computed from a complete assignment and its problem.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Days understaffed | Days with fewer assigned staff than the minimum |
//! | Coverage % | (total - understaffed) / total × 100 |
//! | Work distribution | Days worked per staff member, zeros included |
//! | Weekend / holiday days | Calendar days flagged weekend / holiday |
//! | Assigned slots | Number of (staff, date) cells set to 1 |
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering: A review of
//! applications, methods and models"

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::csp::{Assignment, RosterProblem};

/// Roster statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterStats {
    /// Days in the roster window.
    pub total_days: usize,
    /// Days with fewer staff than required.
    pub days_understaffed: usize,
    /// Share of fully staffed days (0.0..=100.0).
    pub coverage_percentage: f64,
    /// Days worked per staff member, ordered by name.
    pub staff_work_distribution: BTreeMap<String, u32>,
    /// Weekend days in the window.
    pub weekend_days: usize,
    /// Holiday days (including in-lieu days) in the window.
    pub holiday_days: usize,
    /// Assigned (staff, date) cells.
    pub assigned_slots: usize,
    /// Staff assigned per date.
    pub coverage_by_date: BTreeMap<NaiveDate, u32>,
}

impl RosterStats {
    /// Computes statistics for an assignment.
    pub fn calculate(problem: &RosterProblem, assignment: &Assignment, min_staff: usize) -> Self {
        let total_days = problem.day_count();
        let days_understaffed = (0..total_days)
            .filter(|&d| assignment.coverage(d) < min_staff)
            .count();

        let coverage_percentage = if total_days == 0 {
            100.0
        } else {
            (total_days - days_understaffed) as f64 / total_days as f64 * 100.0
        };

        let staff_work_distribution = problem
            .staff()
            .iter()
            .enumerate()
            .map(|(s, staff)| (staff.name.clone(), assignment.workload(s) as u32))
            .collect();

        let coverage_by_date = problem
            .days()
            .iter()
            .enumerate()
            .map(|(d, day)| (day.date, assignment.coverage(d) as u32))
            .collect();

        Self {
            total_days,
            days_understaffed,
            coverage_percentage,
            staff_work_distribution,
            weekend_days: problem.days().iter().filter(|d| d.is_weekend).count(),
            holiday_days: problem.days().iter().filter(|d| d.is_holiday).count(),
            assigned_slots: assignment.assigned_slots(),
            coverage_by_date,
        }
    }

    /// Whether every day meets the minimum.
    pub fn is_fully_staffed(&self) -> bool {
        self.days_understaffed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HolidayTable, InLieuPolicy, RosterCalendar, Staff};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn make_problem() -> RosterProblem {
        let staff = vec![Staff::new("B", "X"), Staff::new("A", "Y")];
        // 2024-06-07 (Fri) ..= 2024-06-10 (Mon), holiday on the Sunday
        let table = HolidayTable::new("SG").with_holiday(d(9), "Festival");
        let days = RosterCalendar::build(&table, d(7), d(10), InLieuPolicy::SundayToMonday);
        RosterProblem::new(staff, days.into_days())
    }

    #[test]
    fn test_stats_basic() {
        let p = make_problem();
        let a = Assignment::from_rows(&[
            vec![true, true, false, true],
            vec![false, true, true, false],
        ])
        .unwrap();
        let stats = RosterStats::calculate(&p, &a, 1);
        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.days_understaffed, 0);
        assert!((stats.coverage_percentage - 100.0).abs() < 1e-10);
        assert_eq!(stats.weekend_days, 2);
        // Sunday holiday plus Monday in lieu
        assert_eq!(stats.holiday_days, 2);
        assert_eq!(stats.assigned_slots, 5);
        assert_eq!(stats.coverage_by_date[&d(8)], 2);
        assert!(stats.is_fully_staffed());
    }

    #[test]
    fn test_stats_understaffed() {
        let p = make_problem();
        let a = Assignment::from_rows(&[
            vec![true, false, false, true],
            vec![false, false, true, false],
        ])
        .unwrap();
        let stats = RosterStats::calculate(&p, &a, 1);
        assert_eq!(stats.days_understaffed, 1);
        assert!((stats.coverage_percentage - 75.0).abs() < 1e-10);
        assert!(!stats.is_fully_staffed());
    }

    #[test]
    fn test_distribution_sorted_with_zeros() {
        let p = make_problem();
        let a = Assignment::all_off(2, 4);
        let stats = RosterStats::calculate(&p, &a, 1);
        let names: Vec<&String> = stats.staff_work_distribution.keys().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(stats.staff_work_distribution.values().sum::<u32>(), 0);
        assert_eq!(stats.days_understaffed, 4);
    }

    #[test]
    fn test_stats_empty_window() {
        let p = RosterProblem::new(vec![Staff::new("A", "X")], Vec::new());
        let stats = RosterStats::calculate(&p, &Assignment::all_off(1, 0), 1);
        assert_eq!(stats.total_days, 0);
        assert!((stats.coverage_percentage - 100.0).abs() < 1e-10);
    }
}
