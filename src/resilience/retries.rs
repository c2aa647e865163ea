//! Retry logic.
//!
//! # Responsibilities
//! - Consult the circuit breaker before every attempt
//! - Feed each attempt's outcome back into the breaker
//! - Retry failed attempts with exponential backoff
//! - Stop retrying as soon as the breaker opens
//! - Bound every attempt and backoff wait by the request deadline
//!
//! Backoff waits are `tokio::time::sleep`, so only the calling request is
//! suspended.

use std::fmt::Display;
use std::future::Future;

use tokio::time::Instant;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitOpen};

/// Outcome of a call that did not succeed.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Rejected by the breaker before any network attempt.
    CircuitOpen(CircuitOpen),
    /// This failure pushed the breaker open; remaining attempts were skipped.
    Tripped { attempts: u32, last: E },
    /// Every attempt failed, or the next backoff would overrun the deadline.
    Exhausted { attempts: u32, last: E },
    /// The deadline passed while an attempt was in flight.
    DeadlineExceeded { attempts: u32 },
}

/// Outcome label used in logs and metrics.
pub trait AttemptOutcome {
    fn outcome(&self) -> &'static str;
}

/// Runs upstream calls under a retry budget and a circuit breaker.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryExecutor {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::from_config(config),
        }
    }

    /// Execute `op` until it succeeds, the breaker opens, attempts run out,
    /// or `deadline` passes.
    pub async fn execute<T, E, F, Fut>(
        &self,
        breaker: &CircuitBreaker,
        call: &'static str,
        deadline: Instant,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        E: Display + AttemptOutcome,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt_index = 0u32;
        loop {
            if let Err(open) = breaker.try_acquire() {
                tracing::warn!(
                    call,
                    retry_after_secs = open.retry_after.as_secs(),
                    "Circuit open, failing fast"
                );
                metrics::record_attempt(call, "rejected");
                return Err(RetryError::CircuitOpen(open));
            }

            let attempts = attempt_index + 1;
            let result = match tokio::time::timeout_at(deadline, op()).await {
                Ok(result) => result,
                Err(_) => {
                    // The hung attempt counts against the breaker.
                    metrics::record_attempt(call, "deadline");
                    tracing::warn!(call, attempt = attempts, "Upstream attempt hit request deadline");
                    breaker.record_failure();
                    return Err(RetryError::DeadlineExceeded { attempts });
                }
            };

            match result {
                Ok(value) => {
                    breaker.record_success();
                    metrics::record_attempt(call, "success");
                    tracing::debug!(call, attempt = attempts, "Upstream call succeeded");
                    return Ok(value);
                }
                Err(err) => {
                    metrics::record_attempt(call, err.outcome());
                    tracing::warn!(call, attempt = attempts, error = %err, "Upstream attempt failed");

                    if breaker.record_failure() {
                        return Err(RetryError::Tripped { attempts, last: err });
                    }
                    if attempts >= self.max_attempts {
                        return Err(RetryError::Exhausted { attempts, last: err });
                    }

                    let delay = self.backoff.delay(attempt_index);
                    if Instant::now() + delay >= deadline {
                        tracing::warn!(call, attempt = attempts, delay = ?delay, "Backoff would overrun request deadline");
                        return Err(RetryError::Exhausted { attempts, last: err });
                    }
                    tracing::info!(call, attempt = attempts, delay = ?delay, "Retrying upstream call");
                    tokio::time::sleep(delay).await;
                    attempt_index += 1;
                }
            }
        }
    }
}
