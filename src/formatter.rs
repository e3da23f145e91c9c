//! Roster rendering.
//!
//! Turns a complete assignment into the caller-facing day map. Staff
//! are listed in pool order and specialties in order of first
//! appearance among them.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::csp::{Assignment, RosterProblem};
use crate::error::RosterError;
use crate::models::DayRoster;

/// Renders assignments of one problem.
#[derive(Debug, Clone, Copy)]
pub struct RosterFormatter<'a> {
    problem: &'a RosterProblem,
}

impl<'a> RosterFormatter<'a> {
    /// Creates a formatter.
    pub fn new(problem: &'a RosterProblem) -> Self {
        Self { problem }
    }

    /// Renders every day of the window.
    ///
    /// # Errors
    /// [`RosterError::Invariant`] if the assignment does not match the
    /// problem's shape, is incomplete, or puts anyone to work on a leave
    /// day.
    pub fn render(
        &self,
        assignment: &Assignment,
    ) -> Result<BTreeMap<NaiveDate, DayRoster>, RosterError> {
        let p = self.problem;
        if assignment.staff_count() != p.staff_count() || assignment.day_count() != p.day_count() {
            return Err(RosterError::Invariant(format!(
                "assignment is {}x{}, problem is {}x{}",
                assignment.staff_count(),
                assignment.day_count(),
                p.staff_count(),
                p.day_count()
            )));
        }
        if !assignment.is_complete() {
            return Err(RosterError::Invariant(format!(
                "{} variables left unassigned",
                assignment.unassigned_count()
            )));
        }
        if let Some(var) = assignment
            .vars()
            .find(|&v| assignment.get(v) == Some(true) && !p.domain(v).allows_work())
        {
            return Err(RosterError::Invariant(format!(
                "{} assigned on leave day {}",
                p.staff()[var.staff].name,
                p.days()[var.day].date
            )));
        }

        let mut roster = BTreeMap::new();
        for (d, info) in p.days().iter().enumerate() {
            let working = assignment.working_staff(d);
            let mut specialties: Vec<String> = Vec::new();
            for &s in &working {
                let specialty = &p.staff()[s].specialty;
                if !specialties.contains(specialty) {
                    specialties.push(specialty.clone());
                }
            }
            roster.insert(
                info.date,
                DayRoster {
                    staff: working.iter().map(|&s| p.staff()[s].name.clone()).collect(),
                    specialties,
                    available_count: p.available_count(d),
                    is_weekend: info.is_weekend,
                    is_holiday: info.is_holiday,
                    holiday_name: info.holiday_name.clone(),
                    is_in_lieu: info.is_in_lieu,
                },
            );
        }
        Ok(roster)
    }
}
