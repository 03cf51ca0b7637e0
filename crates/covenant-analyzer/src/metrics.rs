//! Metrics collection for analysis runs

use std::collections::BTreeMap;

/// Counters collected during one analysis run
///
/// Every candidate that does not become a conflict is accounted for here:
/// as a rejection, a no-conflict verdict, a failed call or a cancelled item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisMetrics {
    /// Candidate pairs handed to the analyzer
    pub candidates: usize,

    /// Topic buckets truncated during candidate selection
    pub truncated_buckets: usize,

    /// Screening calls that returned a response
    pub screened: usize,

    /// Oracle calls issued (screening and votes)
    pub oracle_calls: usize,

    /// Failed oracle calls by error kind
    pub failures: BTreeMap<String, usize>,

    /// Rejected responses by reason kind
    pub rejections: BTreeMap<String, usize>,

    /// Valid verdicts that the clauses do not conflict
    pub no_conflict: usize,

    /// Consistency votes issued
    pub votes_cast: usize,

    /// Consistency votes that affirmed the conflict
    pub votes_affirming: usize,

    /// Conflicts accepted
    pub accepted: usize,

    /// Work items skipped or abandoned because of cancellation
    pub cancelled_items: usize,

    /// Wall-clock runtime in milliseconds
    pub runtime_ms: u64,
}

impl AnalysisMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed oracle call
    pub fn record_failure(&mut self, kind: &str) {
        *self.failures.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// Record a rejected oracle response
    pub fn record_rejection(&mut self, kind: &str) {
        *self.rejections.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// Get total failed calls across all kinds
    pub fn total_failures(&self) -> usize {
        self.failures.values().sum()
    }

    /// Get total rejections across all reasons
    pub fn total_rejections(&self) -> usize {
        self.rejections.values().sum()
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Analysis Metrics Summary".to_string(),
            "========================".to_string(),
            format!("Candidates: {}", self.candidates),
            format!("Truncated buckets: {}", self.truncated_buckets),
            format!("Screened: {}", self.screened),
            format!("Oracle calls: {}", self.oracle_calls),
            format!("No conflict: {}", self.no_conflict),
            format!("Votes: {} cast, {} affirming", self.votes_cast, self.votes_affirming),
            format!("Accepted: {}", self.accepted),
            format!("Cancelled items: {}", self.cancelled_items),
            format!("Runtime: {}ms", self.runtime_ms),
        ];

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failures by kind:".to_string());
            for (kind, count) in &self.failures {
                lines.push(format!("  {}: {}", kind, count));
            }
            lines.push(format!("  Total: {}", self.total_failures()));
        }

        if !self.rejections.is_empty() {
            lines.push(String::new());
            lines.push("Rejections by reason:".to_string());
            for (kind, count) in &self.rejections {
                lines.push(format!("  {}: {}", kind, count));
            }
            lines.push(format!("  Total: {}", self.total_rejections()));
        }

        lines.join("\n")
    }
}
