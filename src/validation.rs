//! Input validation for roster requests.
//!
//! Checks a request before any solving. Every problem is collected;
//! a request is never partially processed. Detects:
//! - Empty or duplicate staff
//! - Out-of-range rule values
//! - Bad or over-long roster windows
//! - Leave intervals that end before they start
//! - Names in leave, aversion, history or team maps that are not staff

use std::collections::HashSet;

use crate::models::GenerateRosterRequest;

/// Largest allowed `min_staff_per_day`.
pub const MAX_MIN_STAFF: u32 = 100;
/// Allowed range of `max_consecutive_days`.
pub const MAX_CONSECUTIVE_RANGE: std::ops::RangeInclusive<u32> = 1..=14;
/// Longest allowed distance between roster start and end, in days.
pub const MAX_ROSTER_SPAN_DAYS: i64 = 90;
/// Allowed range of weekend aversion scores.
pub const AVERSION_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The staff pool is empty.
    NoStaff,
    /// Two staff members share a name.
    DuplicateStaff,
    /// `min_staff_per_day` outside 1..=100.
    InvalidMinimumStaff,
    /// `max_consecutive_days` outside 1..=14.
    InvalidMaxConsecutiveDays,
    /// Roster end before roster start.
    InvalidDateRange,
    /// Roster window longer than 90 days.
    RosterTooLong,
    /// Leave interval ends before it starts.
    InvalidLeaveInterval,
    /// A name that is not in the staff pool.
    UnknownStaff,
    /// Weekend aversion outside 0..=10 or not finite.
    InvalidWeekendAversion,
    /// Specialty target of zero.
    InvalidSpecialtyTarget,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a roster request.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &GenerateRosterRequest) -> ValidationResult {
    let mut errors = Vec::new();
    let rules = &request.rules;

    if request.staff.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoStaff,
            "Staff list is empty",
        ));
    }

    let mut names = HashSet::new();
    for staff in &request.staff {
        if !names.insert(staff.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateStaff,
                format!("Duplicate staff name: {}", staff.name),
            ));
        }
    }

    if rules.min_staff_per_day < 1 || rules.min_staff_per_day > MAX_MIN_STAFF {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidMinimumStaff,
            format!(
                "min_staff_per_day must be between 1 and {MAX_MIN_STAFF}, got {}",
                rules.min_staff_per_day
            ),
        ));
    }

    if !MAX_CONSECUTIVE_RANGE.contains(&rules.max_consecutive_days) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidMaxConsecutiveDays,
            format!(
                "max_consecutive_days must be between 1 and 14, got {}",
                rules.max_consecutive_days
            ),
        ));
    }

    let span = (rules.roster_end - rules.roster_start).num_days();
    if span < 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDateRange,
            format!(
                "roster_end {} is before roster_start {}",
                rules.roster_end, rules.roster_start
            ),
        ));
    } else if span > MAX_ROSTER_SPAN_DAYS {
        errors.push(ValidationError::new(
            ValidationErrorKind::RosterTooLong,
            format!("Roster spans {span} days, at most {MAX_ROSTER_SPAN_DAYS} allowed"),
        ));
    }

    if rules.min_specialties_per_day == Some(0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSpecialtyTarget,
            "min_specialties_per_day must be at least 1",
        ));
    }

    let mut check_known = |name: &str, source: &str| {
        if !names.contains(name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStaff,
                format!("{source} references unknown staff '{name}'"),
            ));
        }
    };

    for leave in &request.leave_intervals {
        check_known(&leave.staff_name, "Leave interval");
    }
    if let Some(aversion) = &rules.weekend_aversion {
        for name in aversion.keys() {
            check_known(name, "weekend_aversion");
        }
    }
    if let Some(history) = &rules.historical_holiday_counts {
        for name in history.keys() {
            check_known(name, "historical_holiday_counts");
        }
    }
    if let Some(teams) = &rules.team_preferences {
        for (name, mates) in teams {
            check_known(name, "team_preferences");
            for mate in mates {
                check_known(mate, "team_preferences");
            }
        }
    }

    for leave in &request.leave_intervals {
        if leave.last_day() < leave.start_date {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidLeaveInterval,
                format!(
                    "Leave for '{}' ends {} before it starts {}",
                    leave.staff_name,
                    leave.last_day(),
                    leave.start_date
                ),
            ));
        }
    }

    if let Some(aversion) = &rules.weekend_aversion {
        for (name, score) in aversion {
            if !score.is_finite() || !AVERSION_RANGE.contains(score) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidWeekendAversion,
                    format!("Weekend aversion for '{name}' must be within 0..=10, got {score}"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeaveInterval, RosterRules, Staff};
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn make_staff() -> Vec<Staff> {
        vec![
            Staff::new("A", "Cardiology"),
            Staff::new("B", "Cardiology"),
            Staff::new("C", "Surgery"),
        ]
    }

    fn sample_request() -> GenerateRosterRequest {
        GenerateRosterRequest::new(make_staff(), RosterRules::new(2, d(6, 1), d(6, 30)))
            .with_leave(LeaveInterval::new("A", d(6, 3), d(6, 5)))
    }

    fn kinds(request: &GenerateRosterRequest) -> Vec<ValidationErrorKind> {
        validate_request(request)
            .unwrap_err()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_valid_request() {
        assert!(validate_request(&sample_request()).is_ok());
    }

    #[test]
    fn test_no_staff() {
        let mut req = sample_request();
        req.staff.clear();
        req.leave_intervals.clear();
        assert_eq!(kinds(&req), vec![ValidationErrorKind::NoStaff]);
    }

    #[test]
    fn test_duplicate_staff() {
        let mut req = sample_request();
        req.staff.push(Staff::new("A", "Surgery"));
        assert!(kinds(&req).contains(&ValidationErrorKind::DuplicateStaff));
    }

    #[test]
    fn test_minimum_staff_bounds() {
        let mut req = sample_request();
        req.rules.min_staff_per_day = 0;
        assert!(kinds(&req).contains(&ValidationErrorKind::InvalidMinimumStaff));
        req.rules.min_staff_per_day = 101;
        assert!(kinds(&req).contains(&ValidationErrorKind::InvalidMinimumStaff));
        req.rules.min_staff_per_day = 100;
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_max_consecutive_bounds() {
        let mut req = sample_request();
        req.rules.max_consecutive_days = 0;
        assert!(kinds(&req).contains(&ValidationErrorKind::InvalidMaxConsecutiveDays));
        req.rules.max_consecutive_days = 15;
        assert!(kinds(&req).contains(&ValidationErrorKind::InvalidMaxConsecutiveDays));
        req.rules.max_consecutive_days = 14;
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_date_range() {
        let mut req = sample_request();
        req.rules.roster_end = d(5, 31);
        assert!(kinds(&req).contains(&ValidationErrorKind::InvalidDateRange));
    }

    #[test]
    fn test_roster_span_limit() {
        let mut req = sample_request();
        // 2024-06-01 + 90 days = 2024-08-30
        req.rules.roster_end = d(8, 30);
        assert!(validate_request(&req).is_ok());
        req.rules.roster_end = d(8, 31);
        assert_eq!(kinds(&req), vec![ValidationErrorKind::RosterTooLong]);
    }

    #[test]
    fn test_single_day_roster_is_valid() {
        let mut req = sample_request();
        req.rules.roster_end = req.rules.roster_start;
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_leave_interval_reversed() {
        let req = sample_request().with_leave(LeaveInterval::new("B", d(6, 9), d(6, 7)));
        assert_eq!(kinds(&req), vec![ValidationErrorKind::InvalidLeaveInterval]);
    }

    #[test]
    fn test_unknown_staff_references() {
        let mut req = sample_request().with_leave(LeaveInterval::single_day("Z", d(6, 2)));
        req.rules = req
            .rules
            .with_historical_holidays("Y", 2)
            .with_team_preference("A", vec!["X".into()]);
        let found = kinds(&req);
        assert_eq!(
            found
                .iter()
                .filter(|k| **k == ValidationErrorKind::UnknownStaff)
                .count(),
            3
        );
    }

    #[test]
    fn test_weekend_aversion_range() {
        let mut req = sample_request();
        req.rules = req.rules.with_weekend_aversion("A", 10.5);
        assert_eq!(kinds(&req), vec![ValidationErrorKind::InvalidWeekendAversion]);
        let mut req = sample_request();
        req.rules = req.rules.with_weekend_aversion("B", f64::NAN);
        assert_eq!(kinds(&req), vec![ValidationErrorKind::InvalidWeekendAversion]);
    }

    #[test]
    fn test_specialty_target_zero() {
        let mut req = sample_request();
        req.rules = req.rules.with_min_specialties_per_day(0);
        assert_eq!(kinds(&req), vec![ValidationErrorKind::InvalidSpecialtyTarget]);
    }

    #[test]
    fn test_multiple_errors() {
        let mut req = sample_request();
        req.rules.min_staff_per_day = 0;
        req.rules.roster_end = d(5, 1);
        req.rules.max_consecutive_days = 20;
        assert!(kinds(&req).len() >= 3);
    }
}
