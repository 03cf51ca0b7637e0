//! Candidate pair selection
//!
//! Eligible clauses are bucketed by topic; every pair within a bucket becomes
//! a candidate. Override clauses are additionally paired with every other
//! eligible clause. Buckets are capped so the pair count stays bounded.

use covenant_domain::{Clause, ClauseId, ClauseTree, ConflictCandidate};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// A topic bucket that exceeded the member cap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTruncation {
    /// Topic of the bucket
    pub topic: String,

    /// Members before truncation
    pub members: usize,

    /// Members kept (the first in document order)
    pub kept: usize,
}

/// Candidates produced for one tree
#[derive(Debug, Clone, Default)]
pub struct CandidateReport {
    /// Candidate pairs ordered by `(clause_a, clause_b)`
    pub candidates: Vec<ConflictCandidate>,

    /// Buckets that were truncated
    pub truncations: Vec<BucketTruncation>,
}

/// Builds bounded candidate pairs from a tagged clause tree
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    bucket_cap: usize,
}

impl CandidateSelector {
    /// Create a selector with a per-topic member cap
    pub fn new(bucket_cap: usize) -> Self {
        Self { bucket_cap }
    }

    /// Select candidate pairs
    pub fn select(&self, tree: &ClauseTree) -> CandidateReport {
        let eligible: Vec<&Clause> = tree.iter().filter(|c| c.is_eligible()).collect();

        let mut buckets: BTreeMap<&str, Vec<&Clause>> = BTreeMap::new();
        for &clause in &eligible {
            for topic in &clause.topics {
                buckets.entry(topic.as_str()).or_default().push(clause);
            }
        }

        let mut truncations = Vec::new();
        for (topic, members) in buckets.iter_mut() {
            if members.len() > self.bucket_cap {
                warn!(
                    topic = %topic,
                    members = members.len(),
                    kept = self.bucket_cap,
                    "Candidate bucket truncated"
                );
                truncations.push(BucketTruncation {
                    topic: topic.to_string(),
                    members: members.len(),
                    kept: self.bucket_cap,
                });
                members.truncate(self.bucket_cap);
            }
        }

        let mut pairs: BTreeMap<(ClauseId, ClauseId), ConflictCandidate> = BTreeMap::new();

        for members in buckets.values() {
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    let candidate = ConflictCandidate::new(a.id, b.id, shared_topics(a, b));
                    pairs.entry(candidate.key()).or_insert(candidate);
                }
            }
        }

        for overriding in eligible.iter().filter(|c| c.is_override) {
            for other in &eligible {
                if other.id == overriding.id {
                    continue;
                }
                let mut candidate =
                    ConflictCandidate::new(overriding.id, other.id, shared_topics(overriding, other));
                if !pairs.contains_key(&candidate.key()) {
                    candidate.via_override = true;
                    pairs.insert(candidate.key(), candidate);
                }
            }
        }

        debug!(
            eligible = eligible.len(),
            buckets = buckets.len(),
            candidates = pairs.len(),
            "Selected candidate pairs"
        );

        CandidateReport {
            candidates: pairs.into_values().collect(),
            truncations,
        }
    }
}

fn shared_topics(a: &Clause, b: &Clause) -> BTreeSet<String> {
    a.topics.intersection(&b.topics).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(index: usize, parent: Option<usize>, start: usize, text: &str, topics: &[&str]) -> Clause {
        Clause {
            id: ClauseId::from_index(index),
            number: format!("{}", index + 1),
            raw_label: format!("{}", index + 1),
            parent_id: parent.map(ClauseId::from_index),
            depth: usize::from(parent.is_some()),
            heading: None,
            category: None,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            text: text.to_string(),
            start_char: start,
            end_char: start + text.len(),
            body_end: start + text.len(),
            is_override: false,
            is_stub: false,
            is_toc: false,
            is_synthetic: false,
        }
    }

    fn payment_tree() -> ClauseTree {
        let a = "4.1 Payment due Net 30.\n";
        let b = "4.2 Payment due Net 60.\n";
        let c = "9.1 Governing law is Abu Dhabi.\n";
        ClauseTree::from_clauses(vec![
            clause(0, None, 0, a, &["payment"]),
            clause(1, None, a.len(), b, &["payment"]),
            clause(2, None, a.len() + b.len(), c, &["dispute"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_shared_topic_pairs() {
        let report = CandidateSelector::new(40).select(&payment_tree());

        assert_eq!(report.candidates.len(), 1);
        let candidate = &report.candidates[0];
        assert_eq!(candidate.key(), (ClauseId::from_index(0), ClauseId::from_index(1)));
        assert!(candidate.shared_topics.contains("payment"));
        assert!(!candidate.via_override);
        assert!(report.truncations.is_empty());
    }

    #[test]
    fn test_override_pairs_with_everything() {
        let mut clauses = payment_tree().clauses().to_vec();
        clauses[2].is_override = true;
        let tree = ClauseTree::from_clauses(clauses).unwrap();

        let report = CandidateSelector::new(40).select(&tree);
        let keys: Vec<(usize, usize)> = report
            .candidates
            .iter()
            .map(|c| (c.clause_a.index(), c.clause_b.index()))
            .collect();

        assert_eq!(keys, vec![(0, 1), (0, 2), (1, 2)]);
        assert!(report.candidates[1].via_override);
        assert!(report.candidates[1].shared_topics.is_empty());
    }

    #[test]
    fn test_ineligible_clauses_skipped() {
        let mut clauses = payment_tree().clauses().to_vec();
        clauses[1].is_stub = true;
        let tree = ClauseTree::from_clauses(clauses).unwrap();

        assert!(CandidateSelector::new(40).select(&tree).candidates.is_empty());
    }

    #[test]
    fn test_parent_and_child_are_paired() {
        let parent_body = "5. Payment is due within 30 days and the Client shall pay by wire transfer.\n";
        let child_text = "5.1 Notwithstanding clause 5, the Client shall pay within 60 days of invoice.\n";
        let mut parent = clause(0, None, 0, &format!("{}{}", parent_body, child_text), &["payment"]);
        parent.body_end = parent_body.len();
        let mut child = clause(1, Some(0), parent_body.len(), child_text, &["payment"]);
        child.is_override = true;
        let tree = ClauseTree::from_clauses(vec![parent, child]).unwrap();
        assert!(tree.is_ancestor(ClauseId::from_index(0), ClauseId::from_index(1)));

        let report = CandidateSelector::new(40).select(&tree);

        assert_eq!(report.candidates.len(), 1);
        let candidate = &report.candidates[0];
        assert_eq!(candidate.key(), (ClauseId::from_index(0), ClauseId::from_index(1)));
        assert!(candidate.shared_topics.contains("payment"));
        assert!(!candidate.via_override);
    }

    #[test]
    fn test_bucket_truncation() {
        let mut clauses = Vec::new();
        let mut start = 0;
        for i in 0..5 {
            let text = format!("{}. Fee clause.\n", i + 1);
            let len = text.len();
            clauses.push(clause(i, None, start, &text, &["payment"]));
            start += len;
        }
        let tree = ClauseTree::from_clauses(clauses).unwrap();

        let report = CandidateSelector::new(3).select(&tree);

        assert_eq!(report.candidates.len(), 3);
        assert_eq!(
            report.truncations,
            vec![BucketTruncation {
                topic: "payment".to_string(),
                members: 5,
                kept: 3
            }]
        );
        assert!(report
            .candidates
            .iter()
            .all(|c| c.clause_b.index() < 3));
    }
}
