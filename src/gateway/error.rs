//! Gateway error taxonomy.

use thiserror::Error;

use crate::gateway::client::AttemptError;
use crate::resilience::RetryError;

/// Errors surfaced to callers of [`crate::gateway::SearchGateway::search`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client error; never retried.
    #[error("{0}")]
    InvalidRequest(String),

    /// Breaker open; no network attempt was made.
    #[error("Business search is temporarily unavailable, retry in {retry_after_secs} seconds")]
    CircuitOpen { retry_after_secs: u64 },

    /// Breaker tripped during this request, or retries ran out.
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// A response arrived but could not be used.
    #[error("{0}")]
    UpstreamError(String),
}

impl GatewayError {
    /// Whether the caller may reasonably retry later.
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            GatewayError::CircuitOpen { .. } | GatewayError::UpstreamUnavailable(_)
        )
    }

    /// Translate a retry outcome for the named upstream call.
    pub fn from_retry(call: &str, err: RetryError<AttemptError>) -> Self {
        match err {
            RetryError::CircuitOpen(open) => GatewayError::CircuitOpen {
                // Round up so a sub-second remainder never reads as "0 seconds".
                retry_after_secs: open.retry_after.as_secs()
                    + u64::from(open.retry_after.subsec_nanos() > 0),
            },
            RetryError::Tripped { attempts, last } => GatewayError::UpstreamUnavailable(format!(
                "Business registry is experiencing sustained failures ({} call, {} attempt(s), last error: {}); try again later",
                call, attempts, last
            )),
            RetryError::Exhausted { attempts, last } => GatewayError::UpstreamUnavailable(format!(
                "Business registry {} call failed after {} attempt(s): {}",
                call, attempts, last
            )),
            RetryError::DeadlineExceeded { attempts } => GatewayError::UpstreamUnavailable(format!(
                "Business registry {} call timed out after {} attempt(s)",
                call, attempts
            )),
        }
    }
}
