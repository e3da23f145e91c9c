//! Roster generation engine.
//!
//! Runs one request end to end:
//!
//! 1. Validate the request.
//! 2. Build the day calendar (weekends, holidays, in-lieu days).
//! 3. Build the CSP model and narrow domains by leave.
//! 4. Solve with the requested strategy, falling back to greedy.
//! 5. Render the roster and compute statistics and diagnostics.
//!
//! # Fallback chain
//!
//! | Strategy | Tried | On failure |
//! |----------|-------|------------|
//! | `greedy` | greedy | never fails |
//! | `advanced` | integer programming | greedy |
//! | `backtracking` | backtracking | greedy |
//!
//! An unsolvable schedule is never an error: the greedy roster is
//! returned with its shortfall visible in the statistics.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::csp::{Assignment, RosterCsp, RosterProblem};
use crate::error::RosterError;
use crate::formatter::RosterFormatter;
use crate::models::{
    AlgorithmUsed, Availability, GenerateRosterRequest, HolidayCalendar, NoHolidays,
    RosterCalendar, RosterResult, SolveDiagnostics, Strategy,
};
use crate::scheduler::{BacktrackingSolver, GreedySolver, IlpSolver, SearchLimits, SolveOutcome};
use crate::validation::validate_request;

/// Roster generation engine.
///
/// Holds no per-request state: one engine may serve many requests,
/// concurrently if the calendar allows it.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_roster::engine::RosterEngine;
/// use u_roster::models::{GenerateRosterRequest, RosterRules, Staff, AlgorithmUsed};
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
/// let request = GenerateRosterRequest::new(
///     vec![
///         Staff::new("A", "Cardiology"),
///         Staff::new("B", "Cardiology"),
///         Staff::new("C", "Surgery"),
///     ],
///     RosterRules::new(2, day, day),
/// );
///
/// let result = RosterEngine::default().generate(&request).unwrap();
/// assert_eq!(result.algorithm_used, AlgorithmUsed::Greedy);
/// assert_eq!(result.day(day).unwrap().staff, vec!["A", "C"]);
/// ```
pub struct RosterEngine<'a> {
    config: EngineConfig,
    calendar: &'a dyn HolidayCalendar,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Default for RosterEngine<'static> {
    fn default() -> Self {
        Self::new(&NoHolidays)
    }
}

impl<'a> RosterEngine<'a> {
    /// Creates an engine with default configuration.
    pub fn new(calendar: &'a dyn HolidayCalendar) -> Self {
        Self {
            config: EngineConfig::default(),
            calendar,
            interrupt: None,
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an interrupt flag with the backtracking search.
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generates a roster.
    ///
    /// # Errors
    /// - [`RosterError::Config`] if the configuration is invalid.
    /// - [`RosterError::Validation`] if the request is rejected.
    /// - [`RosterError::Invariant`] if a solver broke an internal invariant.
    pub fn generate(&self, request: &GenerateRosterRequest) -> Result<RosterResult, RosterError> {
        self.config.validate()?;
        validate_request(request).map_err(RosterError::Validation)?;
        let rules = &request.rules;

        let calendar = RosterCalendar::build(
            self.calendar,
            rules.roster_start,
            rules.roster_end,
            self.config.calendar.in_lieu,
        );
        info!(
            event = "roster_request",
            staff = request.staff.len(),
            days = calendar.len(),
            strategy = rules.strategy.as_str(),
            jurisdiction = self.calendar.jurisdiction(),
        );

        let problem = RosterProblem::new(request.staff.clone(), calendar.into_days());
        let mut csp = RosterCsp::from_rules(problem, rules, &self.config.weights);
        csp.initialize_domains(&Availability::from_leave_within(
            &request.leave_intervals,
            rules.roster_start,
            rules.roster_end,
        ));

        let started = Instant::now();
        let run = self.solve(&csp, rules.strategy, rules.min_staff_per_day as usize);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let roster = RosterFormatter::new(csp.problem()).render(&run.assignment)?;
        let violations = csp.violations(&run.assignment);
        for v in &violations {
            debug!(
                event = "constraint_violation",
                constraint = %v.constraint,
                entity = %v.entity,
                message = %v.message,
            );
        }
        let stats = csp.statistics(&run.assignment);

        info!(
            event = "roster_generated",
            algorithm = run.algorithm.as_str(),
            days_understaffed = stats.days_understaffed,
            violations = violations.len(),
            elapsed_ms,
        );

        Ok(RosterResult {
            roster,
            stats,
            algorithm_used: run.algorithm,
            diagnostics: SolveDiagnostics {
                requested_strategy: rules.strategy,
                fallback_reason: run.fallback_reason,
                iterations: run.iterations,
                elapsed_ms,
                hard_constraints_satisfied: violations.is_empty(),
                soft_penalty: csp.penalty(&run.assignment),
                violations,
            },
        })
    }

    fn solve(&self, csp: &RosterCsp, strategy: Strategy, min_staff: usize) -> SolverRun {
        let attempt = match strategy {
            Strategy::Greedy => None,
            Strategy::Advanced => {
                let solver = IlpSolver::new(self.config.ilp.clone());
                Some((AlgorithmUsed::Ilp, solver.solve(csp), 0))
            }
            Strategy::Backtracking => {
                let mut limits = SearchLimits::from_config(&self.config.backtracking);
                if let Some(flag) = &self.interrupt {
                    limits = limits.with_interrupt(Arc::clone(flag));
                }
                let (outcome, stats) = BacktrackingSolver::new(limits).solve(csp);
                Some((AlgorithmUsed::Backtracking, outcome, stats.iterations))
            }
        };

        let (fallback_reason, iterations) = match attempt {
            Some((algorithm, SolveOutcome::Solved(assignment), iterations)) => {
                return SolverRun {
                    assignment,
                    algorithm,
                    fallback_reason: None,
                    iterations,
                };
            }
            Some((algorithm, outcome, iterations)) => {
                let reason = outcome
                    .failure_reason()
                    .unwrap_or_else(|| "no solution".to_string());
                warn!(
                    event = "solver_fallback",
                    from = algorithm.as_str(),
                    to = "greedy",
                    reason = %reason,
                );
                (Some(format!("{}: {reason}", algorithm.as_str())), iterations)
            }
            None => (None, 0),
        };

        SolverRun {
            assignment: GreedySolver::new(min_staff).solve(csp.problem()),
            algorithm: AlgorithmUsed::Greedy,
            fallback_reason,
            iterations,
        }
    }
}

struct SolverRun {
    assignment: Assignment,
    algorithm: AlgorithmUsed,
    fallback_reason: Option<String>,
    iterations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoftWeights;
    use crate::models::{HolidayTable, LeaveInterval, RosterRules, Staff};
    use chrono::NaiveDate;
    use std::time::Duration;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn make_staff() -> Vec<Staff> {
        vec![
            Staff::new("A", "Cardiology"),
            Staff::new("B", "Cardiology"),
            Staff::new("C", "Surgery"),
        ]
    }

    fn sample_request(strategy: Strategy) -> GenerateRosterRequest {
        GenerateRosterRequest::new(
            make_staff(),
            RosterRules::new(1, d(3), d(16))
                .with_max_consecutive_days(3)
                .with_strategy(strategy),
        )
    }

    #[test]
    fn test_invalid_request_rejected() {
        let mut req = sample_request(Strategy::Greedy);
        req.rules.min_staff_per_day = 0;
        let err = RosterEngine::default().generate(&req).unwrap_err();
        assert!(matches!(err, RosterError::Validation(_)));
    }

    #[test]
    fn test_greedy_strategy() {
        let result = RosterEngine::default()
            .generate(&sample_request(Strategy::Greedy))
            .unwrap();
        assert_eq!(result.algorithm_used, AlgorithmUsed::Greedy);
        assert_eq!(result.roster.len(), 14);
        assert_eq!(result.diagnostics.fallback_reason, None);
        assert_eq!(result.stats.days_understaffed, 0);
    }

    #[test]
    fn test_advanced_uses_ilp() {
        let result = RosterEngine::default()
            .generate(&sample_request(Strategy::Advanced))
            .unwrap();
        assert_eq!(result.algorithm_used, AlgorithmUsed::Ilp);
        assert!(result.diagnostics.hard_constraints_satisfied);
        assert!(result.diagnostics.violations.is_empty());
    }

    #[test]
    fn test_backtracking_strategy() {
        let result = RosterEngine::default()
            .generate(&sample_request(Strategy::Backtracking))
            .unwrap();
        assert_eq!(result.algorithm_used, AlgorithmUsed::Backtracking);
        assert!(result.diagnostics.iterations > 0);
        assert!(result.diagnostics.hard_constraints_satisfied);
    }

    #[test]
    fn test_backtracking_cutoff_falls_back() {
        let config = EngineConfig::new().with_backtracking(2, Duration::from_secs(5));
        let result = RosterEngine::default()
            .with_config(config)
            .generate(&sample_request(Strategy::Backtracking))
            .unwrap();
        assert_eq!(result.algorithm_used, AlgorithmUsed::Greedy);
        let reason = result.diagnostics.fallback_reason.unwrap();
        assert!(reason.starts_with("backtracking"));
        assert!(reason.contains("iteration limit"));
    }

    #[test]
    fn test_interrupt_falls_back() {
        let flag = Arc::new(AtomicBool::new(true));
        let result = RosterEngine::default()
            .with_interrupt(flag)
            .generate(&sample_request(Strategy::Backtracking))
            .unwrap();
        assert_eq!(result.algorithm_used, AlgorithmUsed::Greedy);
        assert!(result.diagnostics.fallback_reason.unwrap().contains("interrupt"));
    }

    #[test]
    fn test_holiday_calendar_injected() {
        let table = HolidayTable::new("SG").with_holiday(d(9), "Festival");
        let result = RosterEngine::new(&table)
            .generate(&sample_request(Strategy::Greedy))
            .unwrap();
        assert!(result.day(d(9)).unwrap().is_holiday);
        assert!(result.day(d(10)).unwrap().is_in_lieu);
        assert_eq!(result.stats.holiday_days, 2);
    }

    #[test]
    fn test_ilp_timeout_falls_back() {
        let staff: Vec<Staff> = (0..20)
            .map(|i| Staff::new(format!("S{i}"), format!("Unit{}", i % 4)))
            .collect();
        let end = d(1) + chrono::Duration::days(89);
        let req = GenerateRosterRequest::new(
            staff,
            RosterRules::new(6, d(1), end)
                .with_max_consecutive_days(5)
                .with_strategy(Strategy::Advanced),
        );
        let config = EngineConfig::new().with_ilp_time_limit(Duration::from_millis(1));
        let result = RosterEngine::default()
            .with_config(config)
            .generate(&req)
            .unwrap();
        assert_eq!(result.algorithm_used, AlgorithmUsed::Greedy);
        assert_eq!(
            result.diagnostics.fallback_reason.as_deref(),
            Some("ilp: optimizer exceeded time limit of 1 ms")
        );
        assert_eq!(result.roster.len(), 90);
        assert_eq!(result.stats.days_understaffed, 0);
        assert!((result.stats.coverage_percentage - 100.0).abs() < 1e-10);
        assert!(result.roster.values().all(|day| day.staff.len() == 6));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let weights = SoftWeights {
            weekend_preference: -1.0,
            ..SoftWeights::default()
        };
        let err = RosterEngine::default()
            .with_config(EngineConfig::new().with_weights(weights))
            .generate(&sample_request(Strategy::Greedy))
            .unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));

        let err = RosterEngine::default()
            .with_config(EngineConfig::new().with_backtracking(10, Duration::ZERO))
            .generate(&sample_request(Strategy::Backtracking))
            .unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));
    }

    #[test]
    fn test_leave_far_outside_window() {
        let req = GenerateRosterRequest::new(make_staff(), RosterRules::new(1, d(3), d(3)))
            .with_leave(LeaveInterval::new("A", NaiveDate::MIN, NaiveDate::MAX))
            .with_leave(LeaveInterval::new("B", NaiveDate::MIN, d(2)))
            .with_leave(LeaveInterval::new("C", d(4), NaiveDate::MAX));
        let result = RosterEngine::default().generate(&req).unwrap();
        let day = result.day(d(3)).unwrap();
        assert_eq!(day.available_count, 2);
        assert!(!day.staff.contains(&"A".to_string()));
    }

    #[test]
    fn test_leave_respected_on_fallback() {
        let req = sample_request(Strategy::Advanced)
            .with_leave(LeaveInterval::new("A", d(3), d(16)))
            .with_leave(LeaveInterval::new("B", d(3), d(16)));
        // C alone cannot stay within a 3-day run limit
        let result = RosterEngine::default().generate(&req).unwrap();
        assert_eq!(result.algorithm_used, AlgorithmUsed::Greedy);
        assert!(result.dates_for_staff("A").is_empty());
        assert_eq!(result.stats.staff_work_distribution["C"], 14);
        assert!(!result.diagnostics.hard_constraints_satisfied);
    }
}
