//! Configuration for clause extraction
//!
//! Every keyword table and threshold the extraction stages use lives here.
//! The configuration is plain data; [`crate::RuleSet`] compiles it once into
//! patterns and automata that are then passed around explicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keywords that map to one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    /// Category label (`PAYMENT`, `TERM`, ...)
    pub category: String,

    /// Keywords matched at word starts, case-insensitive
    pub keywords: Vec<String>,
}

impl CategoryKeywords {
    fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: strings(keywords),
        }
    }
}

/// Three-tier category table, checked specific → moderate → generic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    /// Checked first
    pub specific: Vec<CategoryKeywords>,

    /// Checked when no specific keyword hits
    pub moderate: Vec<CategoryKeywords>,

    /// Checked last
    pub generic: Vec<CategoryKeywords>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            specific: vec![
                CategoryKeywords::new(
                    "PAYMENT",
                    &["payment", "fee", "invoice", "price", "remuneration", "compensation"],
                ),
                CategoryKeywords::new("TERMINATION", &["terminat", "cancellation", "suspension"]),
                CategoryKeywords::new("LIABILITY", &["liabilit", "liable", "indemn", "limitation of"]),
                CategoryKeywords::new("CONFIDENTIALITY", &["confidential", "non-disclosure"]),
                CategoryKeywords::new(
                    "DISPUTE",
                    &["dispute", "arbitrat", "governing law", "jurisdiction"],
                ),
                CategoryKeywords::new("DEFINITIONS", &["definitions", "interpretation", "defined terms"]),
                CategoryKeywords::new("APPENDIX", &["appendix", "annex", "schedule", "exhibit"]),
            ],
            moderate: vec![
                CategoryKeywords::new(
                    "TERM",
                    &["term of", "duration", "commencement", "renewal", "effective date"],
                ),
                CategoryKeywords::new(
                    "SCOPE",
                    &["scope", "services", "deliverables", "statement of work"],
                ),
            ],
            generic: vec![
                CategoryKeywords::new("PARTIES", &["parties", "party", "between"]),
                CategoryKeywords::new(
                    "GENERAL",
                    &["general", "miscellaneous", "notices", "entire agreement", "severability"],
                ),
            ],
        }
    }
}

/// Configuration for the extraction stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Markers on one line within this many bytes collapse into one
    pub cluster_window: usize,

    /// Minimum length of an ALL-CAPS heading
    pub heading_min_len: usize,

    /// Maximum length of an ALL-CAPS heading
    pub heading_max_len: usize,

    /// ALL-CAPS lines that are boilerplate, never headings
    pub heading_stoplist: Vec<String>,

    /// How far before a heading-less gap child to look for a title line
    pub gap_search_window: usize,

    /// Maximum distance from a heading to the numbered clause it titles
    pub heading_attach_window: usize,

    /// Characters of own text scanned for a category
    pub category_scan_chars: usize,

    /// Three-tier category keywords
    pub categories: CategoryTable,

    /// Topic name → keyword substrings
    pub topics: BTreeMap<String, Vec<String>>,

    /// Maximum members per topic bucket
    pub topic_bucket_cap: usize,

    /// Phrases that mark a clause as asserting precedence
    pub override_phrases: Vec<String>,

    /// Phrases that introduce content elsewhere ("as follows:")
    pub preamble_phrases: Vec<String>,

    /// Content after a preamble phrase below this is a stub
    pub preamble_tail_min_chars: usize,

    /// Clauses with fewer words than this may be stubs
    pub stub_word_threshold: usize,

    /// Words that make a short clause operative
    pub legal_operators: Vec<String>,

    /// Phrases that mark a table of contents anywhere in a clause
    pub toc_phrases: Vec<String>,

    /// First-line headings that mark a table of contents
    pub toc_headings: Vec<String>,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.heading_min_len == 0 || self.heading_min_len > self.heading_max_len {
            return Err("heading_min_len must be in 1..=heading_max_len".to_string());
        }
        if self.gap_search_window == 0 {
            return Err("gap_search_window must be greater than 0".to_string());
        }
        if self.category_scan_chars == 0 {
            return Err("category_scan_chars must be greater than 0".to_string());
        }
        if self.topic_bucket_cap < 2 {
            return Err("topic_bucket_cap must be at least 2".to_string());
        }
        if self.topics.is_empty() {
            return Err("topics must not be empty".to_string());
        }
        for (topic, keywords) in &self.topics {
            if keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(format!("topic '{}' has no keywords", topic));
            }
        }
        if self.stub_word_threshold == 0 {
            return Err("stub_word_threshold must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Aggressive preset: tighter buckets and windows for large documents
    pub fn aggressive() -> Self {
        Self {
            topic_bucket_cap: 25,
            gap_search_window: 300,
            heading_attach_window: 120,
            ..Self::default()
        }
    }

    /// Lenient preset: wider buckets and windows for thorough review
    pub fn lenient() -> Self {
        Self {
            topic_bucket_cap: 80,
            gap_search_window: 800,
            heading_attach_window: 300,
            stub_word_threshold: 10,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            cluster_window: 5,
            heading_min_len: 3,
            heading_max_len: 100,
            heading_stoplist: strings(&[
                "WHEREAS",
                "NOW THEREFORE",
                "NOW, THEREFORE",
                "IN WITNESS WHEREOF",
                "SIGNED",
                "SIGNATURE",
                "SIGNATURES",
                "DATE",
                "NAME",
                "TITLE",
                "BY",
                "PAGE",
                "AND",
                "THE",
            ]),
            gap_search_window: 500,
            heading_attach_window: 200,
            category_scan_chars: 200,
            categories: CategoryTable::default(),
            topics: default_topics(),
            topic_bucket_cap: 40,
            override_phrases: strings(&[
                "notwithstanding",
                "shall prevail",
                "shall override",
                "takes precedence",
                "take precedence",
                "supersede",
                "in the event of conflict",
                "in the event of any conflict",
                "in the event of inconsistency",
                "in the event of any inconsistency",
                "in case of conflict",
                "prevail over",
            ]),
            preamble_phrases: strings(&[
                "it is agreed that:",
                "it is agreed as follows",
                "it is hereby agreed as follows",
                "agree as follows",
                "as follows:",
                "now therefore",
                "now, therefore",
            ]),
            preamble_tail_min_chars: 20,
            stub_word_threshold: 15,
            legal_operators: strings(&[
                "shall",
                "must",
                "may",
                "will",
                "notwithstanding",
                "hereby",
                "agree",
                "agrees",
                "agreed",
                "undertake",
                "undertakes",
                "warrant",
                "warrants",
                "represents",
                "entitled",
                "liable",
                "obliged",
                "required",
            ]),
            toc_phrases: strings(&["table of contents"]),
            toc_headings: strings(&["index", "contents", "table of contents"]),
        }
    }
}

fn default_topics() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 12] = [
        (
            "payment",
            &["payment", "pay ", "payable", "invoice", "fee", "price", "remuneration", "net 30", "net 60"],
        ),
        ("termination", &["terminat", "cancel", "expir", "suspend", "suspension"]),
        (
            "liability",
            &["liabilit", "liable", "indemn", "damages", "limitation of"],
        ),
        (
            "confidentiality",
            &["confidential", "non-disclosure", "proprietary information", "trade secret"],
        ),
        (
            "intellectual_property",
            &["intellectual property", "copyright", "patent", "trademark", "licen"],
        ),
        ("warranty", &["warrant", "guarantee", "defect"]),
        (
            "dispute",
            &["dispute", "arbitrat", "governing law", "jurisdiction", "court", "mediat"],
        ),
        ("insurance", &["insurance", "insured", "insurer"]),
        ("audit", &["audit", "inspection", "books and records"]),
        ("subcontractor", &["subcontract", "sub-contract", "assign"]),
        (
            "force_majeure",
            &["force majeure", "act of god", "beyond its reasonable control", "beyond the reasonable control"],
        ),
        (
            "data_privacy",
            &["personal data", "data protection", "privacy", "gdpr", "data subject"],
        ),
    ];

    table
        .iter()
        .map(|(topic, keywords)| (topic.to_string(), strings(keywords)))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
