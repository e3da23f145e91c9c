//! Rostering constraint library.
//!
//! Every rule is a variant of [`Constraint`]: a fixed, enumerated set
//! evaluated uniformly through the same contract. Hard rules answer
//! `check`; soft rules answer `penalty`. Both are pure functions of the
//! problem and the (possibly partial) assignment.
//!
//! | Constraint | Type | Rule |
//! |------------|------|------|
//! | MinimumStaff | hard | assigned staff per day ≥ minimum |
//! | MaxConsecutiveDays | hard | no run of assigned days longer than the maximum |
//! | MinRestPeriod | hard | at least N free days between two assigned days |
//! | SpecialtyCoverage | hard | distinct specialties per day ≥ target, capped by availability |
//! | FairWorkload | soft | workload variance above a tolerance |
//! | WeekendPreference | soft | weekend assignments weighted by aversion |
//! | HolidayDistribution | soft | variance of lifetime holiday load |
//! | TeamPreference | soft | preferred teammates missing on a worked day |
//!
//! # Partial assignments
//! Hard rules treat unassigned cells optimistically: a rule only fails
//! once no completion of the unassigned cells could satisfy it.

mod hard;
mod soft;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::SoftWeights;
use crate::csp::{Assignment, RosterProblem, Var};
use crate::models::Staff;

/// Whether a constraint must hold or is merely penalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    /// Must hold in every accepted solution.
    Hard,
    /// Violations are penalized, never rejected.
    Soft,
}

/// A rostering rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// Every day has at least `min_staff` assigned staff.
    MinimumStaff { min_staff: usize },

    /// No staff member works more than `max_days` days in a row.
    MaxConsecutiveDays { max_days: usize },

    /// Two assigned days of the same staff member are separated by at
    /// least `min_rest_days` free days.
    MinRestPeriod { min_rest_days: usize },

    /// Every day covers `min(target, specialties available that day)`
    /// distinct specialties.
    SpecialtyCoverage { target: usize },

    /// Penalty `weight * (variance - tolerance)` once workload variance
    /// exceeds `tolerance`.
    FairWorkload { weight: f64, tolerance: f64 },

    /// Penalty `weight * Σ aversion[s]` over weekend assignments.
    /// `aversion` is indexed by staff.
    WeekendPreference { weight: f64, aversion: Vec<f64> },

    /// Penalty `weight * variance(historical + current holidays)`.
    /// `historical` is indexed by staff.
    HolidayDistribution { weight: f64, historical: Vec<u32> },

    /// Penalty `weight` per preferred teammate absent on a day the
    /// staff member works. `preferred` is indexed by staff.
    TeamPreference {
        weight: f64,
        preferred: Vec<Vec<usize>>,
    },
}

impl Constraint {
    /// Creates a MinimumStaff rule.
    pub fn minimum_staff(min_staff: usize) -> Self {
        Self::MinimumStaff { min_staff }
    }

    /// Creates a MaxConsecutiveDays rule.
    pub fn max_consecutive_days(max_days: usize) -> Self {
        Self::MaxConsecutiveDays { max_days }
    }

    /// Creates a MinRestPeriod rule.
    pub fn min_rest_period(min_rest_days: usize) -> Self {
        Self::MinRestPeriod { min_rest_days }
    }

    /// Creates a SpecialtyCoverage rule.
    pub fn specialty_coverage(target: usize) -> Self {
        Self::SpecialtyCoverage { target }
    }

    /// Creates a FairWorkload rule.
    pub fn fair_workload(weight: f64, tolerance: f64) -> Self {
        Self::FairWorkload { weight, tolerance }
    }

    /// Creates a WeekendPreference rule from named aversion scores.
    ///
    /// Staff without a score get `default_aversion`.
    pub fn weekend_preference(
        staff: &[Staff],
        scores: &HashMap<String, f64>,
        default_aversion: f64,
        weight: f64,
    ) -> Self {
        let aversion = staff
            .iter()
            .map(|s| scores.get(&s.name).copied().unwrap_or(default_aversion))
            .collect();
        Self::WeekendPreference { weight, aversion }
    }

    /// Creates a HolidayDistribution rule from named historical counts.
    pub fn holiday_distribution(
        staff: &[Staff],
        counts: &HashMap<String, u32>,
        weight: f64,
    ) -> Self {
        let historical = staff
            .iter()
            .map(|s| counts.get(&s.name).copied().unwrap_or(0))
            .collect();
        Self::HolidayDistribution { weight, historical }
    }

    /// Creates a TeamPreference rule from named teammate lists.
    ///
    /// Teammates not in the staff pool are dropped.
    pub fn team_preference(
        staff: &[Staff],
        preferences: &HashMap<String, Vec<String>>,
        weight: f64,
    ) -> Self {
        let index_of = |name: &str| staff.iter().position(|s| s.name == name);
        let preferred = staff
            .iter()
            .map(|s| {
                preferences
                    .get(&s.name)
                    .map(|mates| mates.iter().filter_map(|m| index_of(m)).collect())
                    .unwrap_or_default()
            })
            .collect();
        Self::TeamPreference { weight, preferred }
    }

    /// The default soft rules for a staff pool.
    pub fn default_soft_set(
        staff: &[Staff],
        weights: &SoftWeights,
        aversion: &HashMap<String, f64>,
        history: &HashMap<String, u32>,
        teams: &HashMap<String, Vec<String>>,
    ) -> Vec<Self> {
        vec![
            Self::fair_workload(weights.fair_workload, weights.fair_workload_tolerance),
            Self::weekend_preference(
                staff,
                aversion,
                weights.default_weekend_aversion,
                weights.weekend_preference,
            ),
            Self::holiday_distribution(staff, history, weights.holiday_distribution),
            Self::team_preference(staff, teams, weights.team_preference),
        ]
    }

    /// Rule name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinimumStaff { .. } => "minimum_staff",
            Self::MaxConsecutiveDays { .. } => "max_consecutive_days",
            Self::MinRestPeriod { .. } => "min_rest_period",
            Self::SpecialtyCoverage { .. } => "specialty_coverage",
            Self::FairWorkload { .. } => "fair_workload",
            Self::WeekendPreference { .. } => "weekend_preference",
            Self::HolidayDistribution { .. } => "holiday_distribution",
            Self::TeamPreference { .. } => "team_preference",
        }
    }

    /// Hard or soft.
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            Self::MinimumStaff { .. }
            | Self::MaxConsecutiveDays { .. }
            | Self::MinRestPeriod { .. }
            | Self::SpecialtyCoverage { .. } => ConstraintType::Hard,
            _ => ConstraintType::Soft,
        }
    }

    /// Whether this is a hard rule.
    #[inline]
    pub fn is_hard(&self) -> bool {
        self.constraint_type() == ConstraintType::Hard
    }

    /// Penalty weight of a soft rule.
    pub fn weight(&self) -> Option<f64> {
        match self {
            Self::FairWorkload { weight, .. }
            | Self::WeekendPreference { weight, .. }
            | Self::HolidayDistribution { weight, .. }
            | Self::TeamPreference { weight, .. } => Some(*weight),
            _ => None,
        }
    }

    /// Whether the rule holds. Soft rules always hold.
    pub fn check(&self, problem: &RosterProblem, assignment: &Assignment) -> bool {
        match self {
            Self::MinimumStaff { min_staff } => (0..problem.day_count())
                .all(|d| hard::day_can_reach_minimum(problem, assignment, d, *min_staff)),
            Self::MaxConsecutiveDays { max_days } => (0..problem.staff_count())
                .all(|s| hard::longest_run(assignment, s) <= *max_days),
            Self::MinRestPeriod { min_rest_days } => (0..problem.staff_count())
                .all(|s| hard::shortest_rest(assignment, s).map_or(true, |r| r >= *min_rest_days)),
            Self::SpecialtyCoverage { target } => (0..problem.day_count())
                .all(|d| hard::day_can_cover_specialties(problem, assignment, d, *target)),
            _ => true,
        }
    }

    /// Whether the rule holds on the row and column touched by `var`.
    ///
    /// Equivalent to [`check`](Self::check) when the assignment was
    /// consistent before `var` changed.
    pub fn check_var(&self, problem: &RosterProblem, assignment: &Assignment, var: Var) -> bool {
        match self {
            Self::MinimumStaff { min_staff } => {
                hard::day_can_reach_minimum(problem, assignment, var.day, *min_staff)
            }
            Self::MaxConsecutiveDays { max_days } => {
                hard::longest_run(assignment, var.staff) <= *max_days
            }
            Self::MinRestPeriod { min_rest_days } => {
                hard::shortest_rest(assignment, var.staff).map_or(true, |r| r >= *min_rest_days)
            }
            Self::SpecialtyCoverage { target } => {
                hard::day_can_cover_specialties(problem, assignment, var.day, *target)
            }
            _ => true,
        }
    }

    /// Non-negative penalty. Hard rules have none.
    pub fn penalty(&self, problem: &RosterProblem, assignment: &Assignment) -> f64 {
        match self {
            Self::FairWorkload { weight, tolerance } => {
                soft::fair_workload(assignment, *weight, *tolerance)
            }
            Self::WeekendPreference { weight, aversion } => {
                soft::weekend_preference(problem, assignment, *weight, aversion)
            }
            Self::HolidayDistribution { weight, historical } => {
                soft::holiday_distribution(problem, assignment, *weight, historical)
            }
            Self::TeamPreference { weight, preferred } => {
                soft::team_preference(assignment, *weight, preferred)
            }
            _ => 0.0,
        }
    }

    /// Diagnostic list of what this rule finds violated.
    pub fn violations(&self, problem: &RosterProblem, assignment: &Assignment) -> Vec<Violation> {
        match self {
            Self::MinimumStaff { min_staff } => hard::understaffed_days(problem, assignment, *min_staff),
            Self::MaxConsecutiveDays { max_days } => {
                hard::overlong_runs(problem, assignment, *max_days)
            }
            Self::MinRestPeriod { min_rest_days } => {
                hard::short_rests(problem, assignment, *min_rest_days)
            }
            Self::SpecialtyCoverage { target } => hard::specialty_gaps(problem, assignment, *target),
            _ => Vec::new(),
        }
    }
}

/// Classification of hard-constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Fewer staff than the daily minimum.
    Understaffed,
    /// Run of assigned days longer than allowed.
    ConsecutiveDaysExceeded,
    /// Too few free days between two assignments.
    InsufficientRest,
    /// Too few specialties covered.
    SpecialtyGap,
    /// Staff assigned on a leave day.
    OnLeave,
}

/// A constraint violation found in an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub kind: ViolationKind,
    /// Name of the rule that reported it.
    pub constraint: String,
    /// Offending entity (date or staff name).
    pub entity: String,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        kind: ViolationKind,
        constraint: impl Into<String>,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            constraint: constraint.into(),
            entity: entity.into(),
            message: message.into(),
        }
    }
}
