//! Roster solvers and statistics.
//!
//! Three solvers share the CSP model:
//!
//! | Solver | Hard rules honored | Optimizes | Can fail |
//! |--------|--------------------|-----------|----------|
//! | [`GreedySolver`] | availability, minimum staff (best effort) | workload balance, online | no |
//! | [`BacktrackingSolver`] | all | nothing (first solution) | yes |
//! | [`IlpSolver`] | all | workload deviation (+ weighted terms) | yes |
//!
//! Failure is reported through [`SolveOutcome`], never as an error.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", Ch. 6

mod backtracking;
mod greedy;
mod ilp;
mod kpi;
mod limits;

pub use backtracking::{BacktrackStats, BacktrackingSolver, Termination};
pub use greedy::GreedySolver;
pub use ilp::IlpSolver;
pub use kpi::RosterStats;
pub use limits::{LimitMonitor, SearchLimits};

use crate::csp::Assignment;

/// Result of a solver run.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// A complete assignment satisfying every hard constraint.
    Solved(Assignment),
    /// No assignment satisfies the hard constraints.
    Infeasible,
    /// The solver gave up (limit, timeout, optimizer error).
    Failed { reason: String },
}

impl SolveOutcome {
    /// Whether a solution was produced.
    #[inline]
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved(_))
    }

    /// Why no solution was produced, if none was.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Solved(_) => None,
            Self::Infeasible => Some("no assignment satisfies the hard constraints".into()),
            Self::Failed { reason } => Some(reason.clone()),
        }
    }
}
