//! Conflict analysis over candidate pairs

use crate::consensus::VoteTally;
use crate::pool::{CallOutcome, OraclePool};
use crate::{AnalysisMetrics, AnalyzerConfig, AnalyzerError, Strategy};
use covenant_domain::{Classification, ClauseTree, ConflictCandidate, VerifiedConflict};
use covenant_oracle::{ClassificationOracle, OracleRequest, OracleResponse, ResilientOracle};
use covenant_verifier::{Judgment, VerificationOutcome, Verifier};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of analysing one set of candidates
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    /// Accepted conflicts in candidate order
    pub conflicts: Vec<VerifiedConflict>,

    /// Counters for the run
    pub metrics: AnalysisMetrics,

    /// Whether the run was cancelled before every item finished
    pub cancelled: bool,
}

/// A candidate ready for the oracle
struct Prepared {
    request: OracleRequest,
}

impl Prepared {
    fn verify(&self, verifier: &Verifier, response: &OracleResponse) -> VerificationOutcome {
        verifier.verify(response, &self.request.clause_a_text, &self.request.clause_b_text)
    }
}

/// Drives candidates through the oracle, the verifier and consistency voting
///
/// # Examples
///
/// ```
/// use covenant_analyzer::{AnalyzerConfig, ConflictAnalyzer};
/// use covenant_domain::ClauseTree;
/// use covenant_oracle::MockOracle;
/// use covenant_verifier::Verifier;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let analyzer = ConflictAnalyzer::new(
///     MockOracle::no_conflict(),
///     Verifier::default_config()?,
///     AnalyzerConfig::default(),
/// )?;
///
/// let report = analyzer
///     .analyze(&ClauseTree::default(), &[], &CancellationToken::new())
///     .await;
/// assert!(report.conflicts.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct ConflictAnalyzer<O> {
    pool: OraclePool<ResilientOracle<O>>,
    verifier: Verifier,
    config: AnalyzerConfig,
}

impl<O: ClassificationOracle + 'static> ConflictAnalyzer<O> {
    /// Create an analyzer
    ///
    /// The oracle is wrapped with the configured deadline and retry policy.
    pub fn new(oracle: O, verifier: Verifier, config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config.validate().map_err(AnalyzerError::Config)?;
        let oracle = ResilientOracle::new(oracle, config.timeout(), config.retry.clone());
        Ok(Self {
            pool: OraclePool::new(Arc::new(oracle), config.max_concurrency),
            verifier,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// The verifier applied to every response
    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// The underlying oracle
    pub fn oracle(&self) -> &O {
        self.pool.oracle().inner()
    }

    /// Analyse candidates drawn from `tree`
    ///
    /// Every candidate gets one screening call. With
    /// [`Strategy::SelfConsistent`], candidates that survive verification
    /// then get fresh votes and need a strict majority. Failed calls count as
    /// non-affirming votes. On cancellation the conflicts accepted so far are
    /// still returned.
    pub async fn analyze(
        &self,
        tree: &ClauseTree,
        candidates: &[ConflictCandidate],
        cancel: &CancellationToken,
    ) -> AnalysisReport {
        let start = Instant::now();
        let mut metrics = AnalysisMetrics::new();
        metrics.candidates = candidates.len();

        let prepared: BTreeMap<usize, Prepared> = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let request = build_request(tree, candidate);
                if request.is_none() {
                    warn!(
                        "Candidate ({}, {}) references a clause outside the tree, skipping",
                        candidate.clause_a, candidate.clause_b
                    );
                }
                request.map(|request| (index, Prepared { request }))
            })
            .collect();

        info!(
            "Analysing {} candidates (strategy: {}, max concurrent: {})",
            prepared.len(),
            self.config.strategy.as_str(),
            self.pool.max_concurrency()
        );

        let survivors = self.screen(&prepared, cancel, &mut metrics).await;

        let accepted: BTreeMap<usize, (Judgment, usize, usize)> = match self.config.strategy {
            Strategy::Single => survivors
                .into_iter()
                .map(|(index, judgment)| (index, (judgment, 1, 1)))
                .collect(),
            Strategy::SelfConsistent => self.vote(&prepared, survivors, cancel, &mut metrics).await,
        };

        let conflicts: Vec<VerifiedConflict> = accepted
            .into_iter()
            .filter_map(|(index, (judgment, vote_count, votes_cast))| {
                candidates
                    .get(index)
                    .map(|candidate| into_conflict(candidate, judgment, vote_count, votes_cast))
            })
            .collect();

        metrics.accepted = conflicts.len();
        metrics.runtime_ms = start.elapsed().as_millis() as u64;
        let cancelled = cancel.is_cancelled();
        if cancelled {
            warn!(
                "Analysis cancelled: {} work items skipped, keeping {} accepted conflicts",
                metrics.cancelled_items,
                conflicts.len()
            );
        }
        info!("Analysis finished:\n{}", metrics.summary());

        AnalysisReport {
            conflicts,
            metrics,
            cancelled,
        }
    }

    /// One call per candidate; returns verified conflicts keyed by candidate index
    async fn screen(
        &self,
        prepared: &BTreeMap<usize, Prepared>,
        cancel: &CancellationToken,
        metrics: &mut AnalysisMetrics,
    ) -> BTreeMap<usize, Judgment> {
        let items = prepared
            .iter()
            .map(|(index, p)| (*index, p.request.clone()))
            .collect();

        let mut survivors = BTreeMap::new();
        for (index, outcome) in self.pool.run(items, cancel).await {
            let Some(p) = prepared.get(&index) else { continue };
            let Some(response) = self.settle(&p.request, outcome, metrics) else {
                continue;
            };
            metrics.screened += 1;
            match self.record(p.verify(&self.verifier, &response), metrics) {
                Some(judgment) => {
                    survivors.insert(index, judgment);
                }
                None => {
                    debug!(
                        "Screening dropped ({}, {})",
                        p.request.clause_a_label, p.request.clause_b_label
                    );
                }
            }
        }

        debug!("{} of {} candidates survived screening", survivors.len(), prepared.len());
        survivors
    }

    /// Fresh votes for every survivor; returns accepted judgments with counts
    async fn vote(
        &self,
        prepared: &BTreeMap<usize, Prepared>,
        survivors: BTreeMap<usize, Judgment>,
        cancel: &CancellationToken,
        metrics: &mut AnalysisMetrics,
    ) -> BTreeMap<usize, (Judgment, usize, usize)> {
        let requested = self.config.votes_per_candidate();
        let items: Vec<(usize, OracleRequest)> = survivors
            .keys()
            .filter_map(|index| prepared.get(index).map(|p| (*index, p)))
            .flat_map(|(index, p)| (0..requested).map(move |_| (index, p.request.clone())))
            .collect();

        let mut tallies: BTreeMap<usize, VoteTally> =
            survivors.keys().map(|index| (*index, VoteTally::new())).collect();

        for (index, outcome) in self.pool.run(items, cancel).await {
            let Some(p) = prepared.get(&index) else { continue };
            if !matches!(outcome, CallOutcome::Cancelled) {
                metrics.votes_cast += 1;
            }
            let Some(response) = self.settle(&p.request, outcome, metrics) else {
                continue;
            };
            let verdict = p.verify(&self.verifier, &response);
            if verdict.is_affirmed() {
                metrics.votes_affirming += 1;
            }
            self.count_verdict(&verdict, metrics);
            if let Some(tally) = tallies.get_mut(&index) {
                tally.record(verdict);
            }
        }

        tallies
            .into_iter()
            .filter_map(|(index, tally)| {
                if !tally.is_accepted(requested) {
                    debug!(
                        "Candidate {} rejected by vote: {}/{} affirming",
                        index,
                        tally.affirming(),
                        requested
                    );
                    return None;
                }
                let judgment = tally.strongest()?.clone();
                Some((index, (judgment, tally.affirming(), requested)))
            })
            .collect()
    }

    /// Unpack a call outcome, counting failures and cancellations
    fn settle(
        &self,
        request: &OracleRequest,
        outcome: CallOutcome,
        metrics: &mut AnalysisMetrics,
    ) -> Option<OracleResponse> {
        match outcome {
            CallOutcome::Response(response) => {
                metrics.oracle_calls += 1;
                Some(response)
            }
            CallOutcome::Failed(e) => {
                metrics.oracle_calls += 1;
                metrics.record_failure(e.kind());
                warn!(
                    "Oracle call for ({}, {}) failed, counting as non-affirming: {}",
                    request.clause_a_label, request.clause_b_label, e
                );
                None
            }
            CallOutcome::Cancelled => {
                metrics.cancelled_items += 1;
                None
            }
        }
    }

    fn record(&self, verdict: VerificationOutcome, metrics: &mut AnalysisMetrics) -> Option<Judgment> {
        self.count_verdict(&verdict, metrics);
        match verdict {
            VerificationOutcome::Affirmed(judgment) => Some(judgment),
            _ => None,
        }
    }

    fn count_verdict(&self, verdict: &VerificationOutcome, metrics: &mut AnalysisMetrics) {
        match verdict {
            VerificationOutcome::Affirmed(_) => {}
            VerificationOutcome::NotConflict => metrics.no_conflict += 1,
            VerificationOutcome::Rejected(reason) => metrics.record_rejection(reason.kind()),
        }
    }
}

/// Build the oracle request for a candidate from the clauses' own bodies
fn build_request(tree: &ClauseTree, candidate: &ConflictCandidate) -> Option<OracleRequest> {
    let a = tree.get(candidate.clause_a)?;
    let b = tree.get(candidate.clause_b)?;
    Some(OracleRequest {
        clause_a_label: a.display_label(),
        clause_b_label: b.display_label(),
        clause_a_text: a.body().to_string(),
        clause_b_text: b.body().to_string(),
        shared_topics: candidate.shared_topics.clone(),
    })
}

fn into_conflict(
    candidate: &ConflictCandidate,
    judgment: Judgment,
    vote_count: usize,
    votes_cast: usize,
) -> VerifiedConflict {
    VerifiedConflict {
        clause_a: candidate.clause_a,
        clause_b: candidate.clause_b,
        shared_topics: candidate.shared_topics.clone(),
        classification: Classification::Conflict,
        confidence: judgment.confidence,
        severity: judgment.severity,
        summary: judgment.summary,
        explanation: judgment.explanation,
        quote_a: judgment.quote_a,
        quote_b: judgment.quote_b,
        vote_count,
        votes_cast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_domain::{Clause, ClauseId, Severity};
    use covenant_oracle::{MockOracle, OracleError, RetryPolicy};
    use std::collections::BTreeSet;

    /// Root clauses, one per line, each labelled by its first word
    fn tree_of(lines: &[&str]) -> ClauseTree {
        let mut clauses = Vec::new();
        let mut offset = 0;
        for (index, line) in lines.iter().enumerate() {
            let number = line.split_whitespace().next().unwrap_or("").to_string();
            clauses.push(Clause {
                id: ClauseId::from_index(index),
                number: number.clone(),
                raw_label: number,
                parent_id: None,
                depth: 0,
                heading: None,
                category: None,
                topics: BTreeSet::from(["payment".to_string()]),
                text: line.to_string(),
                start_char: offset,
                end_char: offset + line.len(),
                body_end: offset + line.len(),
                is_override: false,
                is_stub: false,
                is_toc: false,
                is_synthetic: false,
            });
            offset += line.len() + 1;
        }
        ClauseTree::from_clauses(clauses).unwrap()
    }

    fn candidate(a: usize, b: usize) -> ConflictCandidate {
        ConflictCandidate::new(
            ClauseId::from_index(a),
            ClauseId::from_index(b),
            BTreeSet::from(["payment".to_string()]),
        )
    }

    fn net_terms() -> OracleResponse {
        OracleResponse::conflict(0.95, Severity::High, "Net 30", "Net 60")
            .with_summary("Payment terms differ: 30 days vs 60 days")
    }

    fn config(strategy: Strategy, votes: usize) -> AnalyzerConfig {
        AnalyzerConfig {
            strategy,
            votes,
            max_concurrency: 4,
            timeout_secs: 5,
            retry: RetryPolicy::none(),
        }
    }

    fn analyzer(mock: &MockOracle, config: AnalyzerConfig) -> ConflictAnalyzer<MockOracle> {
        ConflictAnalyzer::new(mock.clone(), Verifier::default_config().unwrap(), config).unwrap()
    }

    const PAYMENT: [&str; 2] = ["4.1 Payment due Net 30.", "4.2 Payment due Net 60."];

    #[tokio::test]
    async fn test_single_strategy_accepts_screened_conflict() {
        let mock = MockOracle::new(net_terms());
        let analyzer = analyzer(&mock, config(Strategy::Single, 1));

        let report = analyzer
            .analyze(&tree_of(&PAYMENT), &[candidate(0, 1)], &CancellationToken::new())
            .await;

        assert_eq!(report.conflicts.len(), 1);
        let conflict = &report.conflicts[0];
        assert_eq!(conflict.severity, Severity::High);
        assert_eq!(conflict.classification, Classification::Conflict);
        assert_eq!((conflict.vote_count, conflict.votes_cast), (1, 1));
        assert_eq!(mock.call_count(), 1);
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_self_consistent_majority() {
        let mock = MockOracle::no_conflict();
        // screening, then votes: yes, no, yes
        for response in [net_terms(), net_terms(), OracleResponse::no_conflict(0.9), net_terms()] {
            mock.push_response(response);
        }
        let analyzer = ConflictAnalyzer::new(
            mock.clone(),
            Verifier::default_config().unwrap(),
            AnalyzerConfig {
                max_concurrency: 1,
                ..config(Strategy::SelfConsistent, 3)
            },
        )
        .unwrap();

        let report = analyzer
            .analyze(&tree_of(&PAYMENT), &[candidate(0, 1)], &CancellationToken::new())
            .await;

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].vote_count, 2);
        assert_eq!(report.conflicts[0].votes_cast, 3);
        assert_eq!(report.metrics.votes_cast, 3);
        assert_eq!(report.metrics.votes_affirming, 2);
        assert_eq!(mock.call_count(), 4);
    }

    #[tokio::test]
    async fn test_split_vote_rejected() {
        let mock = MockOracle::no_conflict();
        for response in [net_terms(), net_terms(), OracleResponse::no_conflict(0.9)] {
            mock.push_response(response);
        }
        let analyzer = ConflictAnalyzer::new(
            mock.clone(),
            Verifier::default_config().unwrap(),
            AnalyzerConfig {
                max_concurrency: 1,
                ..config(Strategy::SelfConsistent, 2)
            },
        )
        .unwrap();

        let report = analyzer
            .analyze(&tree_of(&PAYMENT), &[candidate(0, 1)], &CancellationToken::new())
            .await;

        assert!(report.conflicts.is_empty());
        assert_eq!(report.metrics.votes_affirming, 1);
    }

    #[tokio::test]
    async fn test_failed_votes_are_non_affirming() {
        let mock = MockOracle::no_conflict();
        mock.push_response(net_terms());
        mock.push_error(OracleError::Timeout(5000));
        mock.push_response(net_terms());
        let analyzer = ConflictAnalyzer::new(
            mock.clone(),
            Verifier::default_config().unwrap(),
            AnalyzerConfig {
                max_concurrency: 1,
                ..config(Strategy::SelfConsistent, 2)
            },
        )
        .unwrap();

        let report = analyzer
            .analyze(&tree_of(&PAYMENT), &[candidate(0, 1)], &CancellationToken::new())
            .await;

        assert!(report.conflicts.is_empty());
        assert_eq!(report.metrics.failures["timeout"], 1);
    }

    #[tokio::test]
    async fn test_rejections_are_counted() {
        let mock = MockOracle::new(OracleResponse::conflict(0.95, Severity::High, "Net 90", "Net 60"));
        let analyzer = analyzer(&mock, config(Strategy::SelfConsistent, 2));

        let report = analyzer
            .analyze(&tree_of(&PAYMENT), &[candidate(0, 1)], &CancellationToken::new())
            .await;

        assert!(report.conflicts.is_empty());
        assert_eq!(report.metrics.rejections["grounding"], 1);
        // Rejected at screening, so no votes are spent
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_returns_partial_report() {
        let mock = MockOracle::new(net_terms());
        let analyzer = analyzer(&mock, config(Strategy::Single, 1));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = analyzer
            .analyze(&tree_of(&PAYMENT), &[candidate(0, 1)], &cancel)
            .await;

        assert!(report.cancelled);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.metrics.cancelled_items, 1);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_conflicts_follow_candidate_order() {
        let lines = [
            "1.1 Payment due Net 30.",
            "1.2 Payment due Net 60.",
            "2.1 Payment due Net 45.",
        ];
        let mock = MockOracle::no_conflict();
        mock.add_pair_response(
            "1.1",
            "1.2",
            OracleResponse::conflict(0.95, Severity::Low, "Net 30", "Net 60"),
        );
        mock.add_pair_response(
            "1.2",
            "2.1",
            OracleResponse::conflict(0.95, Severity::Critical, "Net 60", "Net 45"),
        );
        let analyzer = analyzer(&mock, config(Strategy::Single, 1));

        let report = analyzer
            .analyze(
                &tree_of(&lines),
                &[candidate(0, 1), candidate(0, 2), candidate(1, 2)],
                &CancellationToken::new(),
            )
            .await;

        let severities: Vec<Severity> = report.conflicts.iter().map(|c| c.severity).collect();
        assert_eq!(severities, vec![Severity::Low, Severity::Critical]);
        assert_eq!(report.metrics.no_conflict, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ConflictAnalyzer::new(
            MockOracle::no_conflict(),
            Verifier::default_config().unwrap(),
            AnalyzerConfig {
                max_concurrency: 0,
                ..AnalyzerConfig::default()
            },
        );
        assert!(matches!(result, Err(AnalyzerError::Config(_))));
    }
}
