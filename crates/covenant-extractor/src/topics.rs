//! Topic tagging over a single Aho-Corasick automaton

use crate::error::ExtractorError;
use aho_corasick::AhoCorasick;
use std::collections::{BTreeMap, BTreeSet};

/// Tags text with every topic whose keyword list has a hit
pub struct TopicTagger {
    automaton: AhoCorasick,
    /// Topic of each automaton pattern, by pattern index
    pattern_topics: Vec<String>,
}

impl TopicTagger {
    /// Build the automaton for a topic → keywords table
    pub fn new(topics: &BTreeMap<String, Vec<String>>) -> Result<Self, ExtractorError> {
        let mut patterns = Vec::new();
        let mut pattern_topics = Vec::new();
        for (topic, keywords) in topics {
            for keyword in keywords.iter().filter(|k| !k.trim().is_empty()) {
                patterns.push(keyword.to_lowercase());
                pattern_topics.push(topic.clone());
            }
        }

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)?;

        Ok(Self {
            automaton,
            pattern_topics,
        })
    }

    /// Topics present in `text`
    pub fn tag(&self, text: &str) -> BTreeSet<String> {
        self.automaton
            .find_overlapping_iter(text)
            .map(|m| self.pattern_topics[m.pattern().as_usize()].clone())
            .collect()
    }
}
