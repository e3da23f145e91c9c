//! Availability model.
//!
//! Derives per-(staff, date) eligibility from leave intervals. A leave
//! interval blocks every date in `[start_date, end_date]` inclusive;
//! without an end date it blocks a single day.
//!
//! # Precedence
//! Leave is a union: overlapping or duplicate rows for the same staff
//! member produce the same unavailable set as one merged row. No row is
//! ever rejected here; request validation happens upstream.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::calendar::date_range;

/// A leave period for one staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveInterval {
    /// Staff member on leave.
    pub staff_name: String,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive). `None` = single day.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl LeaveInterval {
    /// Creates a single-day leave.
    pub fn single_day(staff_name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            staff_name: staff_name.into(),
            start_date: date,
            end_date: None,
        }
    }

    /// Creates a multi-day leave.
    pub fn new(staff_name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            staff_name: staff_name.into(),
            start_date: start,
            end_date: Some(end),
        }
    }

    /// Last day of leave, defaulting to the start date.
    #[inline]
    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }

    /// Whether the leave covers a date.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.last_day()
    }

    /// Every date covered by the leave.
    pub fn dates(&self) -> Vec<NaiveDate> {
        date_range(self.start_date, self.last_day())
    }

    /// Dates covered by the leave within `[start, end]`.
    pub fn dates_within(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        date_range(self.start_date.max(start), self.last_day().min(end))
    }
}

/// Lookup of unavailable (staff, date) pairs.
#[derive(Debug, Clone, Default)]
pub struct Availability {
    unavailable: HashMap<String, HashSet<NaiveDate>>,
}

impl Availability {
    /// Creates an availability model with everyone available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the model from leave rows.
    pub fn from_leave(leave: &[LeaveInterval]) -> Self {
        let mut availability = Self::new();
        for interval in leave {
            availability.add_leave(interval);
        }
        availability
    }

    /// Builds the model from leave rows, keeping only dates in the
    /// roster window `[start, end]`.
    ///
    /// The set size is bounded by the window, however long the rows are.
    pub fn from_leave_within(leave: &[LeaveInterval], start: NaiveDate, end: NaiveDate) -> Self {
        let mut availability = Self::new();
        for interval in leave {
            availability.add_leave_within(interval, start, end);
        }
        availability
    }

    /// Marks every date of a leave interval unavailable.
    pub fn add_leave(&mut self, interval: &LeaveInterval) {
        let dates = self
            .unavailable
            .entry(interval.staff_name.clone())
            .or_default();
        dates.extend(interval.dates());
    }

    /// Marks the dates of a leave interval inside `[start, end]` unavailable.
    pub fn add_leave_within(&mut self, interval: &LeaveInterval, start: NaiveDate, end: NaiveDate) {
        let dates = self
            .unavailable
            .entry(interval.staff_name.clone())
            .or_default();
        dates.extend(interval.dates_within(start, end));
    }

    /// Builder: adds a leave interval.
    pub fn with_leave(mut self, interval: LeaveInterval) -> Self {
        self.add_leave(&interval);
        self
    }

    /// Whether a staff member can work on a date.
    #[inline]
    pub fn is_available(&self, staff_name: &str, date: NaiveDate) -> bool {
        self.unavailable
            .get(staff_name)
            .map_or(true, |dates| !dates.contains(&date))
    }

    /// Number of leave days recorded for a staff member.
    pub fn leave_days(&self, staff_name: &str) -> usize {
        self.unavailable.get(staff_name).map_or(0, HashSet::len)
    }

    /// Number of staff with at least one leave day.
    pub fn staff_on_leave_count(&self) -> usize {
        self.unavailable.values().filter(|d| !d.is_empty()).count()
    }
}
