//! Transport-level retry policy

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded retry with exponential backoff
///
/// Applies to retryable transport failures only; semantic failures are never
/// retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first (1 = no retry)
    pub max_attempts: u32,

    /// Delay after the first failed attempt
    pub initial_backoff_ms: u64,

    /// Factor applied to the delay after each further failure
    pub multiplier: u32,

    /// Upper bound on any single delay
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after `failures` failed attempts (1-based)
    ///
    /// 1s, 2s, 4s, ... with the default policy.
    pub fn backoff(&self, failures: u32) -> Duration {
        let factor = (self.multiplier as u64).saturating_pow(failures.saturating_sub(1));
        let delay = self.initial_backoff_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_backoff_ms))
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.multiplier == 0 {
            return Err("multiplier must be at least 1".to_string());
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err("initial_backoff_ms must not exceed max_backoff_ms".to_string());
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1000,
            multiplier: 2,
            max_backoff_ms: 30_000,
        }
    }
}
