//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: upstream assumed down, calls fail fast
//! - Half-Open: a single trial call is in flight (strict mode only)
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= threshold
//! Open → Closed: cool-down elapsed (default, optimistic)
//! Open → Half-Open: cool-down elapsed (strict mode)
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails
//! ```
//!
//! One breaker is owned by each gateway instance. The lock is only held for
//! bookkeeping, never across an await point.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Returned when a call is rejected without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitOpen {
    /// Time left until the breaker admits calls again.
    pub retry_after: Duration,
}

/// Point-in-time view of the breaker, for status reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub last_failure_ago_ms: Option<u64>,
}

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure: Option<Instant>,
    is_open: bool,
    /// Set while a strict-mode trial call is outstanding.
    probe_started: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    failure_threshold: u32,
    cool_down: Duration,
    strict_half_open: bool,
}

impl CircuitBreaker {
    pub fn new(config: &CircuitBreakerConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            failure_threshold: config.failure_threshold.max(1),
            cool_down: Duration::from_secs(config.cool_down_secs),
            strict_half_open: config.strict_half_open,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask permission to make an upstream call.
    pub fn try_acquire(&self) -> Result<(), CircuitOpen> {
        self.try_acquire_at(Instant::now())
    }

    pub fn try_acquire_at(&self, now: Instant) -> Result<(), CircuitOpen> {
        let mut state = self.lock();
        if !state.is_open {
            return Ok(());
        }

        if let Some(started) = state.probe_started {
            // A trial call owns the half-open slot. If it never reported back
            // (its request was dropped), hand the slot to the next caller.
            if now.saturating_duration_since(started) < self.cool_down {
                return Err(CircuitOpen {
                    retry_after: self.cool_down - now.saturating_duration_since(started),
                });
            }
        }

        let elapsed = state
            .last_failure
            .map_or(self.cool_down, |at| now.saturating_duration_since(at));
        if elapsed < self.cool_down {
            return Err(CircuitOpen {
                retry_after: self.cool_down - elapsed,
            });
        }

        if self.strict_half_open {
            state.probe_started = Some(now);
            tracing::info!("Circuit breaker half-open, admitting trial call");
        } else {
            state.is_open = false;
            state.failure_count = 0;
            tracing::info!("Circuit breaker cool-down elapsed, closing");
            metrics::record_circuit_state(false);
        }
        Ok(())
    }

    /// Record a successful upstream call.
    pub fn record_success(&self) {
        let mut state = self.lock();
        let was_open = state.is_open;
        state.failure_count = 0;
        state.is_open = false;
        state.probe_started = None;
        drop(state);

        if was_open {
            tracing::info!("Circuit breaker closed after successful trial call");
            metrics::record_circuit_state(false);
        }
    }

    /// Record a failed upstream call.
    ///
    /// Returns `true` when the breaker is open afterwards, in which case the
    /// caller must stop retrying.
    pub fn record_failure(&self) -> bool {
        self.record_failure_at(Instant::now())
    }

    pub fn record_failure_at(&self, now: Instant) -> bool {
        let mut state = self.lock();
        state.failure_count = state.failure_count.saturating_add(1);
        state.last_failure = Some(now);

        let trial_failed = state.probe_started.take().is_some();
        if !trial_failed && state.failure_count < self.failure_threshold {
            return false;
        }

        let newly_opened = !state.is_open || trial_failed;
        state.is_open = true;
        let failure_count = state.failure_count;
        drop(state);

        if newly_opened {
            tracing::warn!(
                failure_count,
                cool_down_secs = self.cool_down.as_secs(),
                trial_failed,
                "Circuit breaker opened"
            );
            metrics::record_circuit_state(true);
        }
        true
    }

    pub fn state(&self) -> CircuitState {
        let state = self.lock();
        match (state.is_open, state.probe_started) {
            (false, _) => CircuitState::Closed,
            (true, Some(_)) => CircuitState::HalfOpen,
            (true, None) => CircuitState::Open,
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let state = self.state();
        let inner = self.lock();
        BreakerSnapshot {
            state,
            failure_count: inner.failure_count,
            last_failure_ago_ms: inner
                .last_failure
                .map(|at| at.elapsed().as_millis() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(strict: bool) -> CircuitBreaker {
        CircuitBreaker::new(&CircuitBreakerConfig {
            failure_threshold: 3,
            cool_down_secs: 300,
            strict_half_open: strict,
        })
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = breaker(false);
        let t0 = Instant::now();

        assert!(!cb.record_failure_at(t0));
        assert!(!cb.record_failure_at(t0));
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.record_failure_at(t0));
        assert_eq!(cb.state(), CircuitState::Open);

        let err = cb.try_acquire_at(t0 + Duration::from_secs(60)).unwrap_err();
        assert_eq!(err.retry_after, Duration::from_secs(240));
    }

    #[test]
    fn test_cool_down_closes_optimistically() {
        let cb = breaker(false);
        let t0 = Instant::now();
        for _ in 0..5 {
            cb.record_failure_at(t0);
        }

        assert!(cb.try_acquire_at(t0 + Duration::from_secs(299)).is_err());
        assert!(cb.try_acquire_at(t0 + Duration::from_secs(300)).is_ok());
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
    }

    #[test]
    fn test_success_resets_failures() {
        let cb = breaker(false);
        let t0 = Instant::now();
        cb.record_failure_at(t0);
        cb.record_failure_at(t0);
        cb.record_success();

        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.state(), CircuitState::Closed);
        // Two more failures are not enough to trip again.
        assert!(!cb.record_failure_at(t0));
        assert!(!cb.record_failure_at(t0));
    }

    #[test]
    fn test_success_closes_open_breaker() {
        let cb = breaker(false);
        let t0 = Instant::now();
        for _ in 0..3 {
            cb.record_failure_at(t0);
        }
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.try_acquire_at(t0).is_ok());
    }

    #[test]
    fn test_strict_mode_admits_single_trial() {
        let cb = breaker(true);
        let t0 = Instant::now();
        for _ in 0..3 {
            cb.record_failure_at(t0);
        }

        let after = t0 + Duration::from_secs(301);
        assert!(cb.try_acquire_at(after).is_ok());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(cb.try_acquire_at(after).is_err(), "second caller must wait for the trial");

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.try_acquire_at(after).is_ok());
    }

    #[test]
    fn test_strict_mode_failed_trial_reopens() {
        let cb = breaker(true);
        let t0 = Instant::now();
        for _ in 0..3 {
            cb.record_failure_at(t0);
        }

        let after = t0 + Duration::from_secs(301);
        assert!(cb.try_acquire_at(after).is_ok());
        assert!(cb.record_failure_at(after));
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(cb.try_acquire_at(after + Duration::from_secs(10)).is_err());
        assert!(cb.try_acquire_at(after + Duration::from_secs(300)).is_ok());
    }

    #[test]
    fn test_abandoned_trial_is_replaced() {
        let cb = breaker(true);
        let t0 = Instant::now();
        for _ in 0..3 {
            cb.record_failure_at(t0);
        }

        let first = t0 + Duration::from_secs(300);
        assert!(cb.try_acquire_at(first).is_ok());
        assert!(cb.try_acquire_at(first + Duration::from_secs(300)).is_ok());
    }

    #[test]
    fn test_snapshot_reports_state() {
        let cb = breaker(false);
        let snapshot = cb.snapshot();
        assert_eq!(snapshot.state, CircuitState::Closed);
        assert!(snapshot.last_failure_ago_ms.is_none());

        cb.record_failure();
        let snapshot = cb.snapshot();
        assert_eq!(snapshot.failure_count, 1);
        assert!(snapshot.last_failure_ago_ms.is_some());
    }
}
