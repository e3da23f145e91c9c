//! Integer-programming solver.
//!
//! # Formulation
//!
//! One binary `x[s,d]` per available (staff, date) pair; leave pairs
//! are the constant 0 and get no variable.
//!
//! | Rule | Inequalities |
//! |------|--------------|
//! | MinimumStaff | `Σ_s x[s,d] ≥ min` for every date |
//! | MaxConsecutiveDays | `Σ x[s,d..d+max] ≤ max` for every window of `max+1` dates |
//! | MinRestPeriod | `Σ x[s,d..d+rest] ≤ 1` for every window of `rest+1` dates |
//! | SpecialtyCoverage | `y[d,k] ≤ Σ_{s∈k} x[s,d]`, `Σ_k y[d,k] ≥ required(d)` |
//!
//! Fairness uses one continuous `dev ≥ 0` with
//! `|n·w_s − Σ w| ≤ n·dev` for every staff member, where `w_s` is the
//! staff member's total and `n` the pool size.
//!
//! # Objective
//! - [`IlpObjective::MinMaxDeviation`]: `min dev`
//! - [`IlpObjective::Weighted`]: `min fair·dev + Σ weekend·aversion(s)·x[s,d]
//!   + Σ holiday·historical(s)·x[s,d]`
//!
//! The optimizer runs on a worker thread and stops itself at the time
//! budget; the caller waits one grace period longer before giving up on
//! the thread. Exceeding the budget is a failure, never an error, even
//! when a solution arrives late. The rounded solution is re-checked
//! against the hard constraints before it is accepted.
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering: A review of
//! applications, methods and models", §4 (integer programming)

use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError};
use good_lp::{
    constraint, microlp, variable, Constraint as LpConstraint, Expression, ProblemVariables,
    ResolutionError, Solution, SolutionStatus, SolverModel, Variable, WithTimeLimit,
};
use tracing::{debug, info, warn};

use super::SolveOutcome;
use crate::config::{IlpConfig, IlpObjective};
use crate::constraints::Constraint;
use crate::csp::{Assignment, RosterCsp, Var};

/// Extra wait past the time budget before the worker thread is abandoned.
const BACKSTOP_GRACE: Duration = Duration::from_secs(1);

/// Integer-programming solver.
#[derive(Debug, Clone, Default)]
pub struct IlpSolver {
    config: IlpConfig,
}

impl IlpSolver {
    /// Creates a solver.
    pub fn new(config: IlpConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &IlpConfig {
        &self.config
    }

    /// Solves the model within the configured time budget.
    pub fn solve(&self, csp: &RosterCsp) -> SolveOutcome {
        let formulation = IlpFormulation::from_csp(csp, &self.config);
        if let Some(day) = formulation.understaffed_day() {
            debug!(event = "ilp_presolve_infeasible", day);
            return SolveOutcome::Infeasible;
        }

        let started = Instant::now();
        info!(
            event = "solve_start",
            solver = "ilp",
            variables = formulation.open.iter().filter(|&&o| o).count(),
            time_limit_ms = self.config.time_limit_ms,
        );

        let (tx, rx) = channel::bounded(1);
        let spawned = thread::Builder::new()
            .name("u-roster-ilp".into())
            .spawn(move || {
                let result = formulation.optimize();
                // Receiver is gone after a timeout
                let _ = tx.send(result);
            });
        if let Err(e) = spawned {
            return SolveOutcome::Failed {
                reason: format!("could not start optimizer thread: {e}"),
            };
        }

        let budget = self.config.time_limit();
        let outcome = match rx.recv_timeout(budget + BACKSTOP_GRACE) {
            Ok(Ok(Optimized::Cells(cells))) if started.elapsed() <= budget => {
                self.accept(csp, cells)
            }
            Ok(Ok(_)) => self.timed_out(false),
            Err(RecvTimeoutError::Timeout) => self.timed_out(true),
            Ok(Err(ResolutionError::Infeasible)) => SolveOutcome::Infeasible,
            Ok(Err(e)) => SolveOutcome::Failed {
                reason: format!("optimizer error: {e}"),
            },
            Err(RecvTimeoutError::Disconnected) => SolveOutcome::Failed {
                reason: "optimizer thread terminated without a result".into(),
            },
        };

        info!(
            event = "solve_end",
            solver = "ilp",
            elapsed_ms = started.elapsed().as_millis() as u64,
            solved = outcome.is_solved(),
        );
        outcome
    }

    fn timed_out(&self, abandoned: bool) -> SolveOutcome {
        warn!(
            event = "ilp_timeout",
            time_limit_ms = self.config.time_limit_ms,
            abandoned,
        );
        SolveOutcome::Failed {
            reason: format!(
                "optimizer exceeded time limit of {} ms",
                self.config.time_limit_ms
            ),
        }
    }

    fn accept(&self, csp: &RosterCsp, cells: Vec<bool>) -> SolveOutcome {
        let problem = csp.problem();
        let day_count = problem.day_count();
        let mut assignment = Assignment::all_off(problem.staff_count(), day_count);
        for (i, &on) in cells.iter().enumerate() {
            if on {
                assignment.set(Var::new(i / day_count, i % day_count), true);
            }
        }
        if !csp.is_consistent(&assignment) {
            return SolveOutcome::Failed {
                reason: "rounded optimizer solution violates hard constraints".into(),
            };
        }
        SolveOutcome::Solved(assignment)
    }
}

fn sum_of(cells: impl Iterator<Item = Option<Variable>>) -> Expression {
    cells.flatten().map(Expression::from).sum()
}

/// Result of one optimizer run.
#[derive(Debug)]
enum Optimized {
    /// Staff-major cells of an optimal solution.
    Cells(Vec<bool>),
    /// The optimizer stopped at its time limit.
    TimedOut,
}

/// Solver-independent copy of everything the optimizer needs.
#[derive(Debug, Clone)]
struct IlpFormulation {
    staff_count: usize,
    day_count: usize,
    open: Vec<bool>,
    specialty_of: Vec<usize>,
    specialty_count: usize,
    weekend: Vec<bool>,
    holiday: Vec<bool>,
    min_staff: usize,
    max_consecutive: Option<usize>,
    min_rest: Option<usize>,
    specialty_target: Option<usize>,
    objective: IlpObjective,
    time_limit: Duration,
    fairness_weight: f64,
    weekend_cost: Vec<f64>,
    holiday_cost: Vec<f64>,
}

impl IlpFormulation {
    fn from_csp(csp: &RosterCsp, config: &IlpConfig) -> Self {
        let problem = csp.problem();
        let staff_count = problem.staff_count();
        let day_count = problem.day_count();

        let mut f = Self {
            staff_count,
            day_count,
            open: (0..staff_count)
                .flat_map(|s| (0..day_count).map(move |d| (s, d)))
                .map(|(s, d)| problem.is_available(s, d))
                .collect(),
            specialty_of: (0..staff_count).map(|s| problem.specialty_of(s)).collect(),
            specialty_count: problem.specialties().len(),
            weekend: problem.days().iter().map(|d| d.is_weekend).collect(),
            holiday: problem.days().iter().map(|d| d.is_holiday).collect(),
            min_staff: 0,
            max_consecutive: None,
            min_rest: None,
            specialty_target: None,
            objective: config.objective,
            time_limit: config.time_limit(),
            fairness_weight: 1.0,
            weekend_cost: vec![0.0; staff_count],
            holiday_cost: vec![0.0; staff_count],
        };

        for c in csp.constraints() {
            match c {
                Constraint::MinimumStaff { min_staff } => f.min_staff = *min_staff,
                Constraint::MaxConsecutiveDays { max_days } => f.max_consecutive = Some(*max_days),
                Constraint::MinRestPeriod { min_rest_days } if config.enforce_rest_and_specialty => {
                    f.min_rest = Some(*min_rest_days)
                }
                Constraint::SpecialtyCoverage { target } if config.enforce_rest_and_specialty => {
                    f.specialty_target = Some(*target)
                }
                Constraint::FairWorkload { weight, .. } => f.fairness_weight = *weight,
                Constraint::WeekendPreference { weight, aversion } => {
                    for (cost, a) in f.weekend_cost.iter_mut().zip(aversion) {
                        *cost = weight * a;
                    }
                }
                Constraint::HolidayDistribution { weight, historical } => {
                    for (cost, h) in f.holiday_cost.iter_mut().zip(historical) {
                        *cost = weight * f64::from(*h);
                    }
                }
                _ => {}
            }
        }
        f
    }

    /// First day whose open variables cannot reach the minimum.
    fn understaffed_day(&self) -> Option<usize> {
        (0..self.day_count).find(|&d| {
            let open = (0..self.staff_count)
                .filter(|&s| self.open[s * self.day_count + d])
                .count();
            open < self.min_staff
        })
    }

    fn required_specialties(&self, day: usize, target: usize) -> usize {
        let mut seen = vec![false; self.specialty_count];
        for s in 0..self.staff_count {
            if self.open[s * self.day_count + day] {
                seen[self.specialty_of[s]] = true;
            }
        }
        target.min(seen.iter().filter(|&&x| x).count())
    }

    /// Builds and solves the program within the time limit.
    fn optimize(&self) -> Result<Optimized, ResolutionError> {
        let mut vars = ProblemVariables::new();
        let x: Vec<Option<Variable>> = self
            .open
            .iter()
            .map(|&open| open.then(|| vars.add(variable().binary())))
            .collect();
        let dev = vars.add(variable().min(0.0));

        let mut constraints: Vec<LpConstraint> = Vec::new();
        let cell = |s: usize, d: usize| x[s * self.day_count + d];

        for d in 0..self.day_count {
            let staffed = sum_of((0..self.staff_count).map(|s| cell(s, d)));
            constraints.push(constraint!(staffed >= self.min_staff as f64));
        }

        if let Some(max) = self.max_consecutive {
            let window = max + 1;
            for s in 0..self.staff_count {
                for start in 0..(self.day_count + 1).saturating_sub(window) {
                    let run = sum_of((start..start + window).map(|d| cell(s, d)));
                    constraints.push(constraint!(run <= max as f64));
                }
            }
        }

        if let Some(rest) = self.min_rest.filter(|&r| r > 0) {
            let window = (rest + 1).min(self.day_count);
            for s in 0..self.staff_count {
                for start in 0..(self.day_count + 1).saturating_sub(window) {
                    let shifts = sum_of((start..start + window).map(|d| cell(s, d)));
                    constraints.push(constraint!(shifts <= 1.0));
                }
            }
        }

        if let Some(target) = self.specialty_target {
            for d in 0..self.day_count {
                let required = self.required_specialties(d, target);
                if required == 0 {
                    continue;
                }
                let mut indicators = Vec::new();
                for k in 0..self.specialty_count {
                    let members = sum_of(
                        (0..self.staff_count)
                            .filter(|&s| self.specialty_of[s] == k)
                            .map(|s| cell(s, d)),
                    );
                    let y = vars.add(variable().binary());
                    constraints.push(constraint!(y <= members));
                    indicators.push(y);
                }
                let covered: Expression = indicators.iter().copied().map(Expression::from).sum();
                constraints.push(constraint!(covered >= required as f64));
            }
        }

        let n = self.staff_count as f64;
        let total = sum_of(x.iter().copied());
        for s in 0..self.staff_count {
            let own = sum_of((0..self.day_count).map(|d| cell(s, d)));
            constraints.push(constraint!(n * own.clone() - total.clone() <= n * dev));
            constraints.push(constraint!(total.clone() - n * own <= n * dev));
        }

        let objective = match self.objective {
            IlpObjective::MinMaxDeviation => Expression::from(dev),
            IlpObjective::Weighted => {
                let mut terms = self.fairness_weight * dev;
                for s in 0..self.staff_count {
                    for d in 0..self.day_count {
                        let Some(v) = cell(s, d) else { continue };
                        let mut cost = 0.0;
                        if self.weekend[d] {
                            cost += self.weekend_cost[s];
                        }
                        if self.holiday[d] {
                            cost += self.holiday_cost[s];
                        }
                        if cost > 0.0 {
                            terms += cost * v;
                        }
                    }
                }
                terms
            }
        };

        let mut model = vars
            .minimise(objective)
            .using(microlp)
            .with_time_limit(self.time_limit.as_secs_f64());
        for c in constraints {
            model.add_constraint(c);
        }

        let started = Instant::now();
        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Err(ResolutionError::Infeasible),
            // Stopped before any incumbent was found
            Err(_) if started.elapsed() >= self.time_limit => return Ok(Optimized::TimedOut),
            Err(e) => return Err(e),
        };
        if matches!(solution.status(), SolutionStatus::TimeLimit) {
            return Ok(Optimized::TimedOut);
        }

        Ok(Optimized::Cells(
            x.iter()
                .map(|v| v.map_or(false, |v| solution.value(v) > 0.5))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoftWeights;
    use crate::csp::RosterProblem;
    use crate::models::{Availability, LeaveInterval, RosterCalendar, RosterRules, Staff};
    use chrono::NaiveDate;

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

    fn make_csp(staff: Vec<Staff>, rules: &RosterRules) -> RosterCsp {
        let days = RosterCalendar::plain(rules.roster_start, rules.roster_end).into_days();
        RosterCsp::from_rules(RosterProblem::new(staff, days), rules, &SoftWeights::default())
    }

    fn solved(outcome: SolveOutcome) -> Assignment {
        match outcome {
            SolveOutcome::Solved(a) => a,
            other => panic!("expected Solved, got {other:?}"),
        }
    }

    #[test]
    fn test_one_day_two_specialties() {
        let rules = RosterRules::new(2, d(3), d(3));
        let csp = make_csp(make_staff(), &rules);
        let a = solved(IlpSolver::default().solve(&csp));
        assert!(a.coverage(0) >= 2);
        assert!(a.works(2, 0), "surgeon must be on");
        assert!(csp.is_consistent(&a));
    }

    #[test]
    fn test_run_limit_infeasible() {
        let rules = RosterRules::new(1, d(3), d(7)).with_max_consecutive_days(2);
        let csp = make_csp(vec![Staff::new("A", "Cardiology")], &rules);
        assert_eq!(IlpSolver::default().solve(&csp), SolveOutcome::Infeasible);
    }

    #[test]
    fn test_presolve_detects_uncovered_day() {
        let rules = RosterRules::new(2, d(3), d(5));
        let mut csp = make_csp(make_staff(), &rules);
        csp.initialize_domains(&Availability::from_leave(&[
            LeaveInterval::single_day("A", d(4)),
            LeaveInterval::single_day("B", d(4)),
        ]));
        assert_eq!(IlpSolver::default().solve(&csp), SolveOutcome::Infeasible);
    }

    #[test]
    fn test_respects_leave_and_run_limit() {
        let rules = RosterRules::new(1, d(3), d(16))
            .with_max_consecutive_days(3)
            .with_min_specialties_per_day(1);
        let mut csp = make_csp(make_staff(), &rules);
        csp.initialize_domains(&Availability::from_leave(&[LeaveInterval::new("B", d(3), d(9))]));
        let a = solved(IlpSolver::default().solve(&csp));
        for day in 0..7 {
            assert!(!a.works(1, day));
        }
        assert!(csp.violations(&a).is_empty());
    }

    #[test]
    fn test_min_rest_encoded() {
        let rules = RosterRules::new(1, d(3), d(8)).with_min_rest_days(1);
        let staff = vec![Staff::new("A", "X"), Staff::new("B", "X")];
        let csp = make_csp(staff, &rules);
        let a = solved(IlpSolver::default().solve(&csp));
        // Two staff, one per day, a day off between shifts: strict alternation
        for day in 0..5 {
            assert!(!(a.works(0, day) && a.works(0, day + 1)));
            assert!(!(a.works(1, day) && a.works(1, day + 1)));
        }
        assert_eq!(a.workloads(), vec![3, 3]);
    }

    #[test]
    fn test_weighted_objective_avoids_weekend_averse_staff() {
        // 2024-06-08 is a Saturday
        let rules = RosterRules::new(1, d(8), d(8))
            .with_weekend_aversion("A", 10.0)
            .with_weekend_aversion("B", 0.0);
        let staff = vec![Staff::new("A", "X"), Staff::new("B", "X")];
        let csp = make_csp(staff, &rules);
        let solver = IlpSolver::new(IlpConfig {
            objective: IlpObjective::Weighted,
            ..IlpConfig::default()
        });
        let a = solved(solver.solve(&csp));
        assert!(a.works(1, 0));
        assert!(!a.works(0, 0));
    }

    #[test]
    fn test_time_limit_is_failure() {
        let staff: Vec<Staff> = (0..20)
            .map(|i| Staff::new(format!("S{i}"), format!("Unit{}", i % 4)))
            .collect();
        let end = d(1) + chrono::Duration::days(89);
        let rules = RosterRules::new(6, d(1), end).with_max_consecutive_days(5);
        let csp = make_csp(staff, &rules);
        let solver = IlpSolver::new(IlpConfig {
            time_limit_ms: 1,
            ..IlpConfig::default()
        });
        match solver.solve(&csp) {
            SolveOutcome::Failed { reason } => {
                assert_eq!(reason, "optimizer exceeded time limit of 1 ms");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_rest_and_specialty_can_be_relaxed() {
        let rules = RosterRules::new(1, d(3), d(4)).with_min_rest_days(1);
        let csp = make_csp(vec![Staff::new("A", "X")], &rules);
        let solver = IlpSolver::new(IlpConfig {
            enforce_rest_and_specialty: false,
            ..IlpConfig::default()
        });
        // Without the rest window the optimizer works A both days; the
        // re-check rejects it
        assert!(matches!(solver.solve(&csp), SolveOutcome::Failed { .. }));
    }
}
