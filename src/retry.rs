//! One retry policy for every retried outbound call.
//!
//! The delay before retry `n` (1-based) is
//!
//! ```text
//! delay = min(base_delay * 2^(n-1), max_delay) + random_jitter(0..=jitter)
//! ```

use rand::{rng, Rng};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            jitter_ms: 250,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), without jitter.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let exp = attempt.saturating_sub(1).min(31) as u32;
        let base = Duration::from_millis(self.base_delay_ms);
        let delay = base.saturating_mul(1u32 << exp);
        delay.min(Duration::from_millis(self.max_delay_ms))
    }

    /// Delay before retry number `attempt`, with random jitter added.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rng().random_range(0..=self.jitter_ms)
        };
        self.backoff(attempt) + Duration::from_millis(jitter)
    }
}

/// HTTP statuses worth retrying: blocked (403), rate limited (429) and server errors.
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::FORBIDDEN
        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}
