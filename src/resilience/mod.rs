//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream call:
//!     → circuit_breaker.rs (fail fast while open)
//!     → retries.rs (attempt, record outcome, retry on failure)
//!     → backoff.rs (delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Every attempt, including retries, consults the breaker
//! - A failure that opens the breaker ends the call immediately
//! - Backoff is an awaited sleep, never a blocking one

pub mod backoff;
pub mod circuit_breaker;
pub mod retries;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitOpen, CircuitState};
pub use retries::{AttemptOutcome, RetryError, RetryExecutor};
