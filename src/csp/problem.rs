//! Problem data shared by every constraint and solver.
//!
//! Staff and days are addressed by index. Domains start open ({0,1})
//! and are narrowed to {0} for leave days by
//! [`RosterProblem::initialize_domains`].

use serde::{Deserialize, Serialize};
use tracing::info;

use super::Var;
use crate::models::{distinct_specialties, Availability, DayInfo, Staff};

/// Values a variable may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    /// {0, 1}: staff is available.
    Open,
    /// {0}: staff is on leave.
    Off,
}

impl Domain {
    /// Values in preference order (1 before 0).
    #[inline]
    pub fn values(&self) -> &'static [bool] {
        match self {
            Self::Open => &[true, false],
            Self::Off => &[false],
        }
    }

    /// Whether the domain contains 1.
    #[inline]
    pub fn allows_work(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Index-addressed rostering problem.
#[derive(Debug, Clone)]
pub struct RosterProblem {
    staff: Vec<Staff>,
    days: Vec<DayInfo>,
    specialties: Vec<String>,
    specialty_of: Vec<usize>,
    domains: Vec<Domain>,
}

impl RosterProblem {
    /// Creates a problem with every domain open.
    pub fn new(staff: Vec<Staff>, days: Vec<DayInfo>) -> Self {
        let specialties: Vec<String> = distinct_specialties(&staff)
            .into_iter()
            .map(String::from)
            .collect();
        let specialty_of = staff
            .iter()
            .map(|s| {
                specialties
                    .iter()
                    .position(|sp| *sp == s.specialty)
                    .unwrap_or_default()
            })
            .collect();
        let domains = vec![Domain::Open; staff.len() * days.len()];
        Self {
            staff,
            days,
            specialties,
            specialty_of,
            domains,
        }
    }

    /// Narrows domains to {0} for every leave day.
    pub fn initialize_domains(&mut self, availability: &Availability) {
        for s in 0..self.staff.len() {
            for d in 0..self.days.len() {
                let open = availability.is_available(&self.staff[s].name, self.days[d].date);
                let i = s * self.days.len() + d;
                self.domains[i] = if open { Domain::Open } else { Domain::Off };
            }
        }
        let total = self.domains.len();
        let open = self.domains.iter().filter(|d| d.allows_work()).count();
        info!(
            event = "domains_initialized",
            available_slots = open,
            total_slots = total,
        );
    }

    /// Staff pool.
    #[inline]
    pub fn staff(&self) -> &[Staff] {
        &self.staff
    }

    /// Roster days.
    #[inline]
    pub fn days(&self) -> &[DayInfo] {
        &self.days
    }

    /// Number of staff.
    #[inline]
    pub fn staff_count(&self) -> usize {
        self.staff.len()
    }

    /// Number of days.
    #[inline]
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Distinct specialties in first-appearance order.
    #[inline]
    pub fn specialties(&self) -> &[String] {
        &self.specialties
    }

    /// Specialty index of a staff member.
    #[inline]
    pub fn specialty_of(&self, staff: usize) -> usize {
        self.specialty_of[staff]
    }

    /// Domain of a variable.
    #[inline]
    pub fn domain(&self, var: Var) -> Domain {
        self.domains[var.staff * self.days.len() + var.day]
    }

    /// Whether a staff member is available on a day.
    #[inline]
    pub fn is_available(&self, staff: usize, day: usize) -> bool {
        self.domain(Var::new(staff, day)).allows_work()
    }

    /// Staff available on a day, in index order.
    pub fn available_staff(&self, day: usize) -> Vec<usize> {
        (0..self.staff.len())
            .filter(|&s| self.is_available(s, day))
            .collect()
    }

    /// Number of staff available on a day.
    pub fn available_count(&self, day: usize) -> usize {
        (0..self.staff.len())
            .filter(|&s| self.is_available(s, day))
            .count()
    }

    /// Number of distinct specialties among staff available on a day.
    pub fn available_specialty_count(&self, day: usize) -> usize {
        let mut seen = vec![false; self.specialties.len()];
        for s in 0..self.staff.len() {
            if self.is_available(s, day) {
                seen[self.specialty_of[s]] = true;
            }
        }
        seen.iter().filter(|&&x| x).count()
    }

    /// Number of open variables.
    pub fn open_slots(&self) -> usize {
        self.domains.iter().filter(|d| d.allows_work()).count()
    }

    /// Staff index by name.
    pub fn staff_index(&self, name: &str) -> Option<usize> {
        self.staff.iter().position(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeaveInterval, RosterCalendar};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn make_problem() -> RosterProblem {
        let staff = vec![
            Staff::new("A", "Cardiology"),
            Staff::new("B", "Cardiology"),
            Staff::new("C", "Surgery"),
        ];
        RosterProblem::new(staff, RosterCalendar::plain(d(3), d(5)).into_days())
    }

    #[test]
    fn test_specialty_indexing() {
        let p = make_problem();
        assert_eq!(p.specialties(), &["Cardiology".to_string(), "Surgery".to_string()]);
        assert_eq!(p.specialty_of(1), 0);
        assert_eq!(p.specialty_of(2), 1);
    }

    #[test]
    fn test_domains_start_open() {
        let p = make_problem();
        assert_eq!(p.open_slots(), 9);
        assert_eq!(p.domain(Var::new(0, 0)).values(), &[true, false]);
    }

    #[test]
    fn test_initialize_domains_from_leave() {
        let mut p = make_problem();
        let av = Availability::from_leave(&[LeaveInterval::new("C", d(4), d(5))]);
        p.initialize_domains(&av);
        assert_eq!(p.domain(Var::new(2, 1)), Domain::Off);
        assert_eq!(p.domain(Var::new(2, 1)).values(), &[false]);
        assert!(p.is_available(2, 0));
        assert_eq!(p.available_count(1), 2);
        assert_eq!(p.available_staff(2), vec![0, 1]);
        assert_eq!(p.available_specialty_count(0), 2);
        assert_eq!(p.available_specialty_count(1), 1);
        assert_eq!(p.open_slots(), 7);
    }

    #[test]
    fn test_staff_index() {
        let p = make_problem();
        assert_eq!(p.staff_index("B"), Some(1));
        assert_eq!(p.staff_index("Z"), None);
    }
}
