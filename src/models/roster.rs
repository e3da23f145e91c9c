//! Roster (rendered solution) model.
//!
//! A roster is the caller-facing view of a solution: one entry per day
//! with the selected staff and derived flags, plus aggregate statistics
//! and diagnostics about how the roster was produced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Strategy;
use crate::constraints::Violation;
use crate::scheduler::RosterStats;

/// One rendered roster day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRoster {
    /// Assigned staff names, in staff-pool order.
    pub staff: Vec<String>,
    /// Distinct specialties among the assigned staff.
    pub specialties: Vec<String>,
    /// Staff not on leave that day.
    pub available_count: usize,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Public holiday (actual or in lieu).
    pub is_holiday: bool,
    /// Holiday name, empty on ordinary days.
    pub holiday_name: String,
    /// Holiday observed in lieu.
    pub is_in_lieu: bool,
}

/// Solver that actually produced the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmUsed {
    /// Greedy heuristic (direct or fallback).
    Greedy,
    /// Integer programming.
    Ilp,
    /// Backtracking search.
    Backtracking,
}

impl AlgorithmUsed {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Ilp => "ilp",
            Self::Backtracking => "backtracking",
        }
    }
}

/// How the roster was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveDiagnostics {
    /// Strategy the caller asked for.
    pub requested_strategy: Strategy,
    /// Why the requested solver was abandoned, if it was.
    pub fallback_reason: Option<String>,
    /// Search nodes (backtracking) or 0.
    pub iterations: u64,
    /// Wall-clock solving time across all attempted solvers.
    pub elapsed_ms: u64,
    /// Whether every hard constraint holds on the final solution.
    pub hard_constraints_satisfied: bool,
    /// Sum of soft-constraint penalties on the final solution.
    pub soft_penalty: f64,
    /// Hard-constraint violations on the final solution.
    pub violations: Vec<Violation>,
}

/// Complete output of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterResult {
    /// Day-keyed roster, in date order.
    pub roster: BTreeMap<NaiveDate, DayRoster>,
    /// Coverage statistics.
    pub stats: RosterStats,
    /// Solver that produced the roster.
    pub algorithm_used: AlgorithmUsed,
    /// Solving diagnostics.
    pub diagnostics: SolveDiagnostics,
}

impl RosterResult {
    /// Roster entry for a date.
    pub fn day(&self, date: NaiveDate) -> Option<&DayRoster> {
        self.roster.get(&date)
    }

    /// Dates a staff member is assigned, in order.
    pub fn dates_for_staff(&self, staff_name: &str) -> Vec<NaiveDate> {
        self.roster
            .iter()
            .filter(|(_, day)| day.staff.iter().any(|s| s == staff_name))
            .map(|(date, _)| *date)
            .collect()
    }

    /// Total assigned (staff, date) cells.
    pub fn assignment_count(&self) -> usize {
        self.roster.values().map(|d| d.staff.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_wire_names() {
        assert_eq!(serde_json::to_string(&AlgorithmUsed::Ilp).unwrap(), r#""ilp""#);
        assert_eq!(AlgorithmUsed::Backtracking.as_str(), "backtracking");
    }

    #[test]
    fn test_day_roster_serializes_flat() {
        let day = DayRoster {
            staff: vec!["A".into()],
            specialties: vec!["ER".into()],
            available_count: 2,
            is_weekend: false,
            is_holiday: true,
            holiday_name: "New Year".into(),
            is_in_lieu: false,
        };
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["available_count"], 2);
        assert_eq!(json["holiday_name"], "New Year");
    }
}
