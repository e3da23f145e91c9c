//! Roster generation request.
//!
//! The request is the whole input of one generation run: the staff pool,
//! their leave, and the rule set. It is validated before any solving
//! (see [`crate::validation`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{LeaveInterval, Staff};
use crate::error::RosterError;

/// Solving strategy requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single-pass greedy heuristic.
    #[default]
    #[serde(alias = "simple")]
    Greedy,
    /// Integer programming first, greedy on failure.
    Advanced,
    /// Exhaustive backtracking search, greedy on failure.
    Backtracking,
}

impl Strategy {
    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Advanced => "advanced",
            Self::Backtracking => "backtracking",
        }
    }
}

/// Rule set for one roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRules {
    /// Minimum assigned staff per day.
    pub min_staff_per_day: u32,
    /// Longest allowed run of consecutive assigned days.
    #[serde(default = "default_max_consecutive_days")]
    pub max_consecutive_days: u32,
    /// Unassigned days required between two assigned days.
    #[serde(default)]
    pub min_rest_days: u32,
    /// First roster day (inclusive).
    pub roster_start: NaiveDate,
    /// Last roster day (inclusive).
    pub roster_end: NaiveDate,
    /// Requested strategy.
    #[serde(default)]
    pub strategy: Strategy,
    /// Weekend aversion per staff member (0..=10, higher = dislikes weekends more).
    #[serde(default)]
    pub weekend_aversion: Option<HashMap<String, f64>>,
    /// Holidays already worked per staff member before this roster.
    #[serde(default)]
    pub historical_holiday_counts: Option<HashMap<String, u32>>,
    /// Preferred teammates per staff member.
    #[serde(default)]
    pub team_preferences: Option<HashMap<String, Vec<String>>>,
    /// Distinct specialties required per day. Defaults to
    /// `min(min_staff_per_day, distinct specialties)`.
    #[serde(default)]
    pub min_specialties_per_day: Option<u32>,
}

fn default_max_consecutive_days() -> u32 {
    5
}

impl RosterRules {
    /// Creates rules with defaults for everything except the window and staffing.
    pub fn new(min_staff_per_day: u32, roster_start: NaiveDate, roster_end: NaiveDate) -> Self {
        Self {
            min_staff_per_day,
            max_consecutive_days: default_max_consecutive_days(),
            min_rest_days: 0,
            roster_start,
            roster_end,
            strategy: Strategy::Greedy,
            weekend_aversion: None,
            historical_holiday_counts: None,
            team_preferences: None,
            min_specialties_per_day: None,
        }
    }

    /// Sets the maximum consecutive working days.
    pub fn with_max_consecutive_days(mut self, days: u32) -> Self {
        self.max_consecutive_days = days;
        self
    }

    /// Sets the minimum rest days between assignments.
    pub fn with_min_rest_days(mut self, days: u32) -> Self {
        self.min_rest_days = days;
        self
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets one staff member's weekend aversion.
    pub fn with_weekend_aversion(mut self, staff: impl Into<String>, score: f64) -> Self {
        self.weekend_aversion
            .get_or_insert_with(HashMap::new)
            .insert(staff.into(), score);
        self
    }

    /// Sets one staff member's historical holiday count.
    pub fn with_historical_holidays(mut self, staff: impl Into<String>, count: u32) -> Self {
        self.historical_holiday_counts
            .get_or_insert_with(HashMap::new)
            .insert(staff.into(), count);
        self
    }

    /// Sets one staff member's preferred teammates.
    pub fn with_team_preference(mut self, staff: impl Into<String>, teammates: Vec<String>) -> Self {
        self.team_preferences
            .get_or_insert_with(HashMap::new)
            .insert(staff.into(), teammates);
        self
    }

    /// Sets the daily specialty target.
    pub fn with_min_specialties_per_day(mut self, target: u32) -> Self {
        self.min_specialties_per_day = Some(target);
        self
    }

    /// Number of days in the window (0 if the window is inverted).
    pub fn total_days(&self) -> usize {
        let span = (self.roster_end - self.roster_start).num_days();
        if span < 0 {
            0
        } else {
            span as usize + 1
        }
    }
}

/// Complete input of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRosterRequest {
    /// Staff pool.
    pub staff: Vec<Staff>,
    /// Leave rows.
    #[serde(default)]
    pub leave_intervals: Vec<LeaveInterval>,
    /// Rule set.
    pub rules: RosterRules,
}

impl GenerateRosterRequest {
    /// Creates a request without leave.
    pub fn new(staff: Vec<Staff>, rules: RosterRules) -> Self {
        Self {
            staff,
            leave_intervals: Vec::new(),
            rules,
        }
    }

    /// Adds a leave row.
    pub fn with_leave(mut self, leave: LeaveInterval) -> Self {
        self.leave_intervals.push(leave);
        self
    }

    /// Parses a JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, RosterError> {
        Ok(serde_json::from_str(payload)?)
    }
}
