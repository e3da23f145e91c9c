//! Engine configuration.
//!
//! Soft-constraint weights, search cutoffs, optimizer budget and holiday
//! observance are tunable without code changes. Every field has a
//! default, so an empty TOML document is a valid configuration.
//!
//! ```
//! use u_roster::config::{EngineConfig, IlpObjective};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     [weights]
//!     weekend_preference = 2.5
//!
//!     [ilp]
//!     time_limit_ms = 3000
//!     objective = "weighted"
//! "#).unwrap();
//!
//! assert_eq!(config.weights.weekend_preference, 2.5);
//! assert_eq!(config.ilp.objective, IlpObjective::Weighted);
//! assert_eq!(config.backtracking.max_iterations, 200_000);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::InLieuPolicy;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Soft-constraint weights.
    pub weights: SoftWeights,
    /// Backtracking cutoffs.
    pub backtracking: BacktrackingConfig,
    /// Integer-programming settings.
    pub ilp: IlpConfig,
    /// Holiday observance.
    pub calendar: CalendarConfig,
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects negative weights and zero budgets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        let named = [
            ("fair_workload", w.fair_workload),
            ("fair_workload_tolerance", w.fair_workload_tolerance),
            ("weekend_preference", w.weekend_preference),
            ("default_weekend_aversion", w.default_weekend_aversion),
            ("holiday_distribution", w.holiday_distribution),
            ("team_preference", w.team_preference),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "weights.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.backtracking.time_limit_ms == 0 {
            return Err(ConfigError::Invalid(
                "backtracking.time_limit_ms must be positive".into(),
            ));
        }
        if self.ilp.time_limit_ms == 0 {
            return Err(ConfigError::Invalid("ilp.time_limit_ms must be positive".into()));
        }
        Ok(())
    }

    /// Sets the soft-constraint weights.
    pub fn with_weights(mut self, weights: SoftWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the ILP objective.
    pub fn with_ilp_objective(mut self, objective: IlpObjective) -> Self {
        self.ilp.objective = objective;
        self
    }

    /// Sets the ILP time budget.
    pub fn with_ilp_time_limit(mut self, limit: Duration) -> Self {
        self.ilp.time_limit_ms = limit.as_millis() as u64;
        self
    }

    /// Sets the backtracking cutoffs.
    pub fn with_backtracking(mut self, max_iterations: u64, time_limit: Duration) -> Self {
        self.backtracking = BacktrackingConfig {
            max_iterations,
            time_limit_ms: time_limit.as_millis() as u64,
        };
        self
    }

    /// Sets the in-lieu observance policy.
    pub fn with_in_lieu(mut self, policy: InLieuPolicy) -> Self {
        self.calendar.in_lieu = policy;
        self
    }
}

/// Soft-constraint weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftWeights {
    /// FairWorkload weight.
    pub fair_workload: f64,
    /// Workload variance tolerated without penalty.
    pub fair_workload_tolerance: f64,
    /// WeekendPreference weight.
    pub weekend_preference: f64,
    /// Aversion used for staff without an explicit score.
    pub default_weekend_aversion: f64,
    /// HolidayDistribution weight.
    pub holiday_distribution: f64,
    /// TeamPreference weight.
    pub team_preference: f64,
}

impl Default for SoftWeights {
    fn default() -> Self {
        Self {
            fair_workload: 10.0,
            fair_workload_tolerance: 2.0,
            weekend_preference: 5.0,
            default_weekend_aversion: 5.0,
            holiday_distribution: 8.0,
            team_preference: 3.0,
        }
    }
}

/// Backtracking cutoffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktrackingConfig {
    /// Search-node budget.
    pub max_iterations: u64,
    /// Wall-clock budget (ms).
    pub time_limit_ms: u64,
}

impl Default for BacktrackingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200_000,
            time_limit_ms: 5_000,
        }
    }
}

impl BacktrackingConfig {
    /// Wall-clock budget.
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }
}

/// ILP objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IlpObjective {
    /// Minimize the largest deviation from mean workload.
    #[default]
    MinMaxDeviation,
    /// Deviation plus linear weekend and holiday penalty terms.
    Weighted,
}

/// Integer-programming settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IlpConfig {
    /// Optimizer budget (ms). Exceeding it counts as solver failure.
    pub time_limit_ms: u64,
    /// Objective formulation.
    pub objective: IlpObjective,
    /// Also encode MinRestPeriod and SpecialtyCoverage as inequalities.
    pub enforce_rest_and_specialty: bool,
}

impl Default for IlpConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 10_000,
            objective: IlpObjective::MinMaxDeviation,
            enforce_rest_and_specialty: true,
        }
    }
}

impl IlpConfig {
    /// Optimizer budget.
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }
}

/// Holiday observance settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// In-lieu observance policy.
    pub in_lieu: InLieuPolicy,
}
