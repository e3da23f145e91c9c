//! CSP model of a roster.
//!
//! One boolean variable per (staff, date). Domains are {0,1} when the
//! staff member is available and {0} on leave days. The model holds the
//! registered constraints and answers consistency and penalty queries
//! for the solvers.
//!
//! # Variable ordering
//! [`RosterCsp::select_unassigned_variable`] uses minimum remaining
//! values: the unassigned variable with the fewest values consistent
//! with the current partial assignment. Ties go to the earliest variable
//! in day-major order. Values are tried 1 before 0.
//!
//! # Reference
//! Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", Ch. 6

mod assignment;
mod problem;

pub use assignment::{Assignment, Var};
pub use problem::{Domain, RosterProblem};

use tracing::debug;

use crate::config::SoftWeights;
use crate::constraints::{Constraint, Violation, ViolationKind};
use crate::models::{Availability, RosterRules};
use crate::scheduler::RosterStats;

/// Variable space, domains and constraints of a roster.
#[derive(Debug, Clone)]
pub struct RosterCsp {
    problem: RosterProblem,
    constraints: Vec<Constraint>,
}

impl RosterCsp {
    /// Creates a model with no constraints.
    pub fn new(problem: RosterProblem) -> Self {
        Self {
            problem,
            constraints: Vec::new(),
        }
    }

    /// Creates a model with every rule implied by the request rules.
    ///
    /// Hard: MinimumStaff, MaxConsecutiveDays, SpecialtyCoverage, and
    /// MinRestPeriod when `min_rest_days > 0`. Soft: the four default
    /// rules weighted by `weights`.
    pub fn from_rules(problem: RosterProblem, rules: &RosterRules, weights: &SoftWeights) -> Self {
        let target = rules
            .min_specialties_per_day
            .map(|t| t as usize)
            .unwrap_or_else(|| (rules.min_staff_per_day as usize).min(problem.specialties().len()));

        let mut csp = Self::new(problem)
            .with_constraint(Constraint::minimum_staff(rules.min_staff_per_day as usize))
            .with_constraint(Constraint::max_consecutive_days(rules.max_consecutive_days as usize))
            .with_constraint(Constraint::specialty_coverage(target));
        if rules.min_rest_days > 0 {
            csp.add_constraint(Constraint::min_rest_period(rules.min_rest_days as usize));
        }

        let empty_aversion = Default::default();
        let empty_history = Default::default();
        let empty_teams = Default::default();
        for c in Constraint::default_soft_set(
            csp.problem.staff(),
            weights,
            rules.weekend_aversion.as_ref().unwrap_or(&empty_aversion),
            rules.historical_holiday_counts.as_ref().unwrap_or(&empty_history),
            rules.team_preferences.as_ref().unwrap_or(&empty_teams),
        ) {
            csp.add_constraint(c);
        }
        csp
    }

    /// Registers a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        debug!(
            event = "constraint_added",
            name = constraint.name(),
            hard = constraint.is_hard(),
        );
        self.constraints.push(constraint);
    }

    /// Registers a constraint (builder form).
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.add_constraint(constraint);
        self
    }

    /// Narrows domains to {0} on leave days.
    pub fn initialize_domains(&mut self, availability: &Availability) {
        self.problem.initialize_domains(availability);
    }

    /// Problem data.
    #[inline]
    pub fn problem(&self) -> &RosterProblem {
        &self.problem
    }

    /// Every registered constraint.
    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Hard constraints.
    pub fn hard_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_hard())
    }

    /// Soft constraints.
    pub fn soft_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| !c.is_hard())
    }

    /// An empty assignment sized to this model.
    pub fn empty_assignment(&self) -> Assignment {
        Assignment::new(self.problem.staff_count(), self.problem.day_count())
    }

    /// Whether no assigned value breaks a domain and every hard rule
    /// can still hold.
    pub fn is_consistent(&self, assignment: &Assignment) -> bool {
        let in_domain = assignment.vars().all(|v| {
            assignment.get(v) != Some(true) || self.problem.domain(v).allows_work()
        });
        in_domain && self.hard_constraints().all(|c| c.check(&self.problem, assignment))
    }

    /// Consistency restricted to the row and column of `var`.
    ///
    /// Equivalent to [`is_consistent`](Self::is_consistent) when the
    /// assignment was consistent before `var` was set.
    pub fn is_consistent_at(&self, assignment: &Assignment, var: Var) -> bool {
        if assignment.get(var) == Some(true) && !self.problem.domain(var).allows_work() {
            return false;
        }
        self.hard_constraints()
            .all(|c| c.check_var(&self.problem, assignment, var))
    }

    /// Sum of soft penalties.
    pub fn penalty(&self, assignment: &Assignment) -> f64 {
        self.soft_constraints()
            .map(|c| c.penalty(&self.problem, assignment))
            .sum()
    }

    /// Minimum-remaining-values choice among unassigned variables.
    ///
    /// Returns `None` when the assignment is complete.
    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<Var> {
        let mut scratch = assignment.clone();
        let mut best: Option<(Var, usize)> = None;
        for day in 0..self.problem.day_count() {
            for staff in 0..self.problem.staff_count() {
                let var = Var::new(staff, day);
                if assignment.get(var).is_some() {
                    continue;
                }
                let legal = self
                    .problem
                    .domain(var)
                    .values()
                    .iter()
                    .filter(|&&value| {
                        scratch.set(var, value);
                        let ok = self.is_consistent_at(&scratch, var);
                        scratch.unset(var);
                        ok
                    })
                    .count();
                if legal == 0 {
                    return Some(var);
                }
                if best.map_or(true, |(_, n)| legal < n) {
                    best = Some((var, legal));
                }
            }
        }
        best.map(|(var, _)| var)
    }

    /// Values of a variable in search order: 1 before 0.
    pub fn order_domain_values(&self, var: Var) -> &'static [bool] {
        self.problem.domain(var).values()
    }

    /// Every hard violation in an assignment, including leave-day
    /// assignments.
    pub fn violations(&self, assignment: &Assignment) -> Vec<Violation> {
        let mut out: Vec<Violation> = assignment
            .vars()
            .filter(|&v| assignment.get(v) == Some(true) && !self.problem.domain(v).allows_work())
            .map(|v| {
                let name = &self.problem.staff()[v.staff].name;
                let date = self.problem.days()[v.day].date;
                Violation::new(
                    ViolationKind::OnLeave,
                    "availability",
                    name.clone(),
                    format!("{name} assigned on leave day {date}"),
                )
            })
            .collect();
        for c in self.hard_constraints() {
            out.extend(c.violations(&self.problem, assignment));
        }
        out
    }

    /// Summary statistics of an assignment under this model.
    pub fn statistics(&self, assignment: &Assignment) -> RosterStats {
        let min_staff = self
            .hard_constraints()
            .find_map(|c| match c {
                Constraint::MinimumStaff { min_staff } => Some(*min_staff),
                _ => None,
            })
            .unwrap_or(0);
        RosterStats::calculate(&self.problem, assignment, min_staff)
    }
}
