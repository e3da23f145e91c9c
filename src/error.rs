//! Error taxonomy.
//!
//! Only input problems and broken internal invariants are errors.
//! An unsolvable schedule is not: solvers report it through
//! [`crate::scheduler::SolveOutcome`] and the engine falls back.

use thiserror::Error;

use crate::config::ConfigError;
use crate::validation::ValidationError;

/// Errors surfaced by roster generation.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The request was rejected before solving.
    #[error("invalid roster request: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    /// The request payload could not be parsed.
    #[error("malformed roster request: {0}")]
    Parse(#[from] serde_json::Error),

    /// Engine configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An internal invariant was broken. Indicates a defect, never retried.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl RosterError {
    /// Validation messages, if this is a validation error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
