//! Staff rostering engine.
//!
//! Assigns staff to dates under availability, coverage, run-length,
//! rest and specialty rules, balancing workload and preferences.
//! Each generation request is an independent, synchronous computation.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Staff`, `LeaveInterval`, `Availability`,
//!   `RosterRules`, `GenerateRosterRequest`, `RosterResult`, holiday calendar
//! - **`constraints`**: The rule library (4 hard, 4 soft rules)
//! - **`csp`**: CSP model: variables, domains, consistency, MRV ordering
//! - **`scheduler`**: Greedy, backtracking and integer-programming solvers,
//!   search limits, roster statistics
//! - **`formatter`**: Assignment → caller-facing roster
//! - **`engine`**: Request orchestration and the fallback chain
//! - **`validation`**: Request integrity checks
//! - **`config`**: Engine configuration (TOML)
//! - **`error`**: Error taxonomy
//!
//! # Architecture
//!
//! Input problems are rejected by `validation` before any solving. Solvers
//! report infeasibility through `scheduler::SolveOutcome`; the `engine`
//! turns any solver failure into a greedy fallback, so an unsolvable
//! schedule still yields a roster with its shortfall in the statistics.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The state of the art of nurse rostering"
//! - Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", Ch. 6

pub mod config;
pub mod constraints;
pub mod csp;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use engine::RosterEngine;
pub use error::RosterError;
