//! Timeout and retry wrapper for any oracle

use crate::error::OracleError;
use crate::retry::RetryPolicy;
use crate::types::{OracleRequest, OracleResponse};
use crate::ClassificationOracle;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Wraps an oracle with a per-attempt deadline and a bounded retry policy
///
/// After the last attempt the final error is returned unchanged; the caller
/// decides what a failed call means.
pub struct ResilientOracle<O> {
    inner: O,
    timeout: Duration,
    policy: RetryPolicy,
}

impl<O: ClassificationOracle> ResilientOracle<O> {
    /// Wrap an oracle
    pub fn new(inner: O, timeout: Duration, policy: RetryPolicy) -> Self {
        Self {
            inner,
            timeout,
            policy,
        }
    }

    /// The wrapped oracle
    pub fn inner(&self) -> &O {
        &self.inner
    }

    async fn attempt(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        match tokio::time::timeout(self.timeout, self.inner.classify(request)).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl<O: ClassificationOracle> ClassificationOracle for ResilientOracle<O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn classify(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempts < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempts);
                    warn!(
                        oracle = self.inner.name(),
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Oracle call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
