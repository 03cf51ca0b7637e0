//! Bounded fan-out of oracle calls

use covenant_oracle::{ClassificationOracle, OracleError, OracleRequest, OracleResponse};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// What became of one work item
#[derive(Debug)]
pub enum CallOutcome {
    /// The oracle answered
    Response(OracleResponse),

    /// The call failed after transport retries
    Failed(OracleError),

    /// Never started, or abandoned, because the run was cancelled
    Cancelled,
}

/// Worker pool limiting the number of oracle calls in flight
///
/// Every work item is its own task; a semaphore permit is taken before the
/// call starts. Once the token is cancelled no further permits are taken and
/// calls still running are abandoned.
pub struct OraclePool<O> {
    oracle: Arc<O>,
    semaphore: Arc<Semaphore>,
    max_concurrency: usize,
}

impl<O: ClassificationOracle + 'static> OraclePool<O> {
    /// Create a pool around a shared oracle
    pub fn new(oracle: Arc<O>, max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            oracle,
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    /// Maximum concurrent calls
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// The shared oracle
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Run every work item and wait for all of them
    ///
    /// Results come back in completion order, each tagged with its key.
    pub async fn run<K>(
        &self,
        items: Vec<(K, OracleRequest)>,
        cancel: &CancellationToken,
    ) -> Vec<(K, CallOutcome)>
    where
        K: Send + 'static,
    {
        let total = items.len();
        let mut tasks = JoinSet::new();

        for (key, request) in items {
            let oracle = Arc::clone(&self.oracle);
            let semaphore = Arc::clone(&self.semaphore);
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return (key, CallOutcome::Cancelled),
                    permit = semaphore.acquire_owned() => permit,
                };
                let Ok(_permit) = permit else {
                    return (key, CallOutcome::Cancelled);
                };

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => CallOutcome::Cancelled,
                    result = oracle.classify(&request) => match result {
                        Ok(response) => CallOutcome::Response(response),
                        Err(e) => CallOutcome::Failed(e),
                    },
                };
                (key, outcome)
            });
        }

        debug!(
            "Dispatched {} oracle calls (max concurrent: {})",
            total, self.max_concurrency
        );

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => warn!("Oracle worker task failed: {}", e),
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use covenant_oracle::MockOracle;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn request(n: usize) -> OracleRequest {
        OracleRequest {
            clause_a_label: format!("{}.1", n),
            clause_b_label: format!("{}.2", n),
            clause_a_text: "a".to_string(),
            clause_b_text: "b".to_string(),
            shared_topics: BTreeSet::new(),
        }
    }

    fn items(count: usize) -> Vec<(usize, OracleRequest)> {
        (0..count).map(|i| (i, request(i))).collect()
    }

    /// Tracks the highest number of simultaneous calls
    #[derive(Default)]
    struct GaugeOracle {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ClassificationOracle for GaugeOracle {
        fn name(&self) -> &str {
            "gauge"
        }

        async fn classify(&self, _request: &OracleRequest) -> Result<OracleResponse, OracleError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(OracleResponse::no_conflict(0.9))
        }
    }

    #[tokio::test]
    async fn test_all_items_complete() {
        let mock = MockOracle::no_conflict();
        let pool = OraclePool::new(Arc::new(mock.clone()), 4);

        let results = pool.run(items(10), &CancellationToken::new()).await;

        assert_eq!(results.len(), 10);
        assert_eq!(mock.call_count(), 10);
        let mut keys: Vec<usize> = results.iter().map(|(k, _)| *k).collect();
        keys.sort();
        assert_eq!(keys, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let oracle = Arc::new(GaugeOracle::default());
        let pool = OraclePool::new(Arc::clone(&oracle), 3);

        pool.run(items(12), &CancellationToken::new()).await;

        assert!(oracle.peak.load(Ordering::SeqCst) <= 3);
        assert!(oracle.peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_failures_are_reported_per_item() {
        let mock = MockOracle::no_conflict();
        mock.add_pair_error("1.1", "1.2", OracleError::Transport("down".to_string()));
        let pool = OraclePool::new(Arc::new(mock), 2);

        let results = pool.run(items(3), &CancellationToken::new()).await;

        let failed: Vec<usize> = results
            .iter()
            .filter(|(_, o)| matches!(o, CallOutcome::Failed(_)))
            .map(|(k, _)| *k)
            .collect();
        assert_eq!(failed, vec![1]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mock = MockOracle::no_conflict();
        let pool = OraclePool::new(Arc::new(mock.clone()), 2);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results = pool.run(items(5), &cancel).await;

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|(_, o)| matches!(o, CallOutcome::Cancelled)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_mid_run_keeps_finished_items() {
        let mock = MockOracle::no_conflict().with_delay(Duration::from_millis(50));
        let pool = OraclePool::new(Arc::new(mock), 1);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(80)).await;
            trigger.cancel();
        });

        let results = pool.run(items(6), &cancel).await;

        let answered = results
            .iter()
            .filter(|(_, o)| matches!(o, CallOutcome::Response(_)))
            .count();
        let cancelled = results
            .iter()
            .filter(|(_, o)| matches!(o, CallOutcome::Cancelled))
            .count();
        assert_eq!(results.len(), 6);
        assert!(answered >= 1);
        assert!(cancelled >= 1);
    }
}
