//! Exponential backoff with optional jitter.

use std::time::Duration;
use rand::Rng;

use crate::config::RetryConfig;

/// Calculate the delay before retry `attempt_index` (0-indexed).
///
/// The delay is `base_ms * 2^attempt_index`, capped at `max_ms` when given.
/// `jitter_ratio` adds up to that fraction of the delay at random; with a
/// ratio of zero the schedule is exact.
pub fn calculate_backoff(
    attempt_index: u32,
    base_ms: u64,
    max_ms: Option<u64>,
    jitter_ratio: f64,
) -> Duration {
    let exponential_base = 2u64.saturating_pow(attempt_index);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = max_ms.map_or(delay_ms, |max| delay_ms.min(max));

    let jitter_range = (capped_delay as f64 * jitter_ratio) as u64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay.saturating_add(jitter))
}

/// Backoff schedule derived from [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct Backoff {
    base_ms: u64,
    max_ms: Option<u64>,
    jitter_ratio: f64,
}

impl Backoff {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            base_ms: config.base_delay_ms,
            max_ms: config.max_delay_ms,
            jitter_ratio: config.jitter_ratio,
        }
    }

    pub fn delay(&self, attempt_index: u32) -> Duration {
        calculate_backoff(attempt_index, self.base_ms, self.max_ms, self.jitter_ratio)
    }
}
