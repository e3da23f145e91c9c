//! Cooperative search cutoffs.
//!
//! A [`SearchLimits`] is started once per search and polled at every
//! node. Cancellation is never preemptive: the search stops at the next
//! node after a limit trips.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::BacktrackingConfig;

/// Iteration, wall-clock and interrupt cutoffs.
#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Maximum number of search nodes.
    pub max_iterations: u64,
    /// Wall-clock budget.
    pub time_limit: Duration,
    /// Raised by another thread to stop the search.
    pub interrupt: Arc<AtomicBool>,
}

impl SearchLimits {
    /// Creates limits with a fresh interrupt flag.
    pub fn new(max_iterations: u64, time_limit: Duration) -> Self {
        Self {
            max_iterations,
            time_limit,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Limits from backtracking configuration.
    pub fn from_config(config: &BacktrackingConfig) -> Self {
        Self::new(config.max_iterations, config.time_limit())
    }

    /// Shares an externally owned interrupt flag.
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Starts the clock.
    pub fn start(&self) -> LimitMonitor<'_> {
        LimitMonitor {
            limits: self,
            started: Instant::now(),
            iterations: 0,
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::from_config(&BacktrackingConfig::default())
    }
}

/// Running state of one search against its limits.
#[derive(Debug)]
pub struct LimitMonitor<'a> {
    limits: &'a SearchLimits,
    started: Instant,
    iterations: u64,
}

impl LimitMonitor<'_> {
    /// Counts a node and reports the first limit reached, if any.
    pub fn step(&mut self) -> Option<String> {
        self.iterations += 1;
        if self.limits.interrupt.load(Ordering::Relaxed) {
            return Some("interrupt signal received".to_string());
        }
        if self.iterations > self.limits.max_iterations {
            return Some(format!(
                "iteration limit of {} reached",
                self.limits.max_iterations
            ));
        }
        if self.started.elapsed() >= self.limits.time_limit {
            return Some(format!(
                "time limit of {} ms reached",
                self.limits.time_limit.as_millis()
            ));
        }
        None
    }

    /// Nodes visited so far.
    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Time since the search started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continues_within_limits() {
        let limits = SearchLimits::new(10, Duration::from_secs(60));
        let mut monitor = limits.start();
        for _ in 0..10 {
            assert!(monitor.step().is_none());
        }
        assert_eq!(monitor.iterations(), 10);
    }

    #[test]
    fn test_iteration_limit() {
        let limits = SearchLimits::new(2, Duration::from_secs(60));
        let mut monitor = limits.start();
        assert!(monitor.step().is_none());
        assert!(monitor.step().is_none());
        let reason = monitor.step().unwrap();
        assert!(reason.contains("iteration limit"));
    }

    #[test]
    fn test_time_limit() {
        let limits = SearchLimits::new(u64::MAX, Duration::ZERO);
        let mut monitor = limits.start();
        assert!(monitor.step().unwrap().contains("time limit"));
    }

    #[test]
    fn test_interrupt() {
        let flag = Arc::new(AtomicBool::new(false));
        let limits = SearchLimits::new(u64::MAX, Duration::from_secs(60)).with_interrupt(flag.clone());
        let mut monitor = limits.start();
        assert!(monitor.step().is_none());
        flag.store(true, Ordering::Relaxed);
        assert_eq!(monitor.step().unwrap(), "interrupt signal received");
    }

    #[test]
    fn test_default_matches_config() {
        let limits = SearchLimits::default();
        assert_eq!(limits.max_iterations, 200_000);
        assert_eq!(limits.time_limit, Duration::from_millis(5_000));
    }
}
