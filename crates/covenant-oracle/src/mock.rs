//! Deterministic mock oracle for testing

use crate::error::OracleError;
use crate::types::{OracleRequest, OracleResponse};
use crate::ClassificationOracle;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type Reply = Result<OracleResponse, OracleError>;

/// Mock oracle returning scripted replies without any network calls
///
/// Replies are chosen in this order:
/// 1. the script registered for the request's clause-label pair; the last
///    entry of a pair script repeats once the others are used up,
/// 2. the shared queue, consumed front to back,
/// 3. the default response.
///
/// Clones share scripts and the call counter.
///
/// # Examples
///
/// ```
/// use covenant_domain::Severity;
/// use covenant_oracle::{MockOracle, OracleResponse};
///
/// let oracle = MockOracle::no_conflict();
/// oracle.add_pair_response("4.1", "4.2", OracleResponse::conflict(0.95, Severity::High, "Net 30", "Net 60"));
/// assert_eq!(oracle.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockOracle {
    default_response: OracleResponse,
    pair_scripts: Arc<Mutex<HashMap<(String, String), VecDeque<Reply>>>>,
    queue: Arc<Mutex<VecDeque<Reply>>>,
    delay: Option<Duration>,
    call_count: Arc<Mutex<usize>>,
}

impl MockOracle {
    /// Create a mock with a fixed default response
    pub fn new(default_response: OracleResponse) -> Self {
        Self {
            default_response,
            pair_scripts: Arc::new(Mutex::new(HashMap::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            delay: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a mock that answers "no conflict" by default
    pub fn no_conflict() -> Self {
        Self::new(OracleResponse::no_conflict(0.9))
    }

    /// Sleep this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append a response to the script for a clause-label pair
    pub fn add_pair_response(&self, label_a: &str, label_b: &str, response: OracleResponse) {
        self.add_pair_reply(label_a, label_b, Ok(response));
    }

    /// Append an error to the script for a clause-label pair
    pub fn add_pair_error(&self, label_a: &str, label_b: &str, error: OracleError) {
        self.add_pair_reply(label_a, label_b, Err(error));
    }

    /// Append a response to the shared queue
    pub fn push_response(&self, response: OracleResponse) {
        lock(&self.queue).push_back(Ok(response));
    }

    /// Append an error to the shared queue
    pub fn push_error(&self, error: OracleError) {
        lock(&self.queue).push_back(Err(error));
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    fn add_pair_reply(&self, label_a: &str, label_b: &str, reply: Reply) {
        lock(&self.pair_scripts)
            .entry((label_a.to_string(), label_b.to_string()))
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, request: &OracleRequest) -> Reply {
        let key = (request.clause_a_label.clone(), request.clause_b_label.clone());
        if let Some(script) = lock(&self.pair_scripts).get_mut(&key) {
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            if let Some(reply) = next {
                return reply;
            }
        }

        if let Some(reply) = lock(&self.queue).pop_front() {
            return reply;
        }

        Ok(self.default_response.clone())
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::no_conflict()
    }
}

#[async_trait]
impl ClassificationOracle for MockOracle {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        *lock(&self.call_count) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.next_reply(request)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_domain::Severity;
    use std::collections::BTreeSet;

    fn request(a: &str, b: &str) -> OracleRequest {
        OracleRequest {
            clause_a_label: a.to_string(),
            clause_b_label: b.to_string(),
            clause_a_text: String::new(),
            clause_b_text: String::new(),
            shared_topics: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn test_default_response() {
        let oracle = MockOracle::no_conflict();
        let response = oracle.classify(&request("1", "2")).await.unwrap();
        assert!(!response.is_conflict);
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_pair_script_repeats_last() {
        let oracle = MockOracle::no_conflict();
        oracle.add_pair_response("1", "2", OracleResponse::conflict(0.9, Severity::High, "a", "b"));
        oracle.add_pair_response("1", "2", OracleResponse::no_conflict(0.8));

        let first = oracle.classify(&request("1", "2")).await.unwrap();
        let second = oracle.classify(&request("1", "2")).await.unwrap();
        let third = oracle.classify(&request("1", "2")).await.unwrap();
        let other = oracle.classify(&request("3", "4")).await.unwrap();

        assert!(first.is_conflict);
        assert!(!second.is_conflict);
        assert!(!third.is_conflict);
        assert_eq!(third.confidence, 0.8);
        assert_eq!(other.confidence, 0.9);
    }

    #[tokio::test]
    async fn test_queue_then_default() {
        let oracle = MockOracle::no_conflict();
        oracle.push_error(OracleError::Transport("down".to_string()));

        assert!(oracle.classify(&request("1", "2")).await.is_err());
        assert!(oracle.classify(&request("1", "2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let oracle = MockOracle::no_conflict();
        let clone = oracle.clone();

        clone.classify(&request("1", "2")).await.unwrap();
        assert_eq!(oracle.call_count(), 1);

        oracle.reset_call_count();
        assert_eq!(clone.call_count(), 0);
    }
}
