//! Verifier configuration

use serde::{Deserialize, Serialize};

/// Configuration for the verification gates
///
/// # Examples
///
/// ```
/// use covenant_verifier::VerifierConfig;
///
/// let config = VerifierConfig::default();
/// assert_eq!(config.confidence_threshold, 0.85);
/// assert_eq!(config.grounding_threshold, 0.70);
///
/// let config = VerifierConfig::strict();
/// assert!(config.confidence_threshold > 0.85);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Minimum oracle confidence for an affirming verdict
    pub confidence_threshold: f64,

    /// Minimum fraction of quote words found in order inside the clause
    pub grounding_threshold: f64,

    /// Quote words shorter than this are ignored unless they contain a digit
    pub min_quote_word_len: usize,

    /// Reject summaries asserting specifics absent from both clauses
    #[serde(default = "default_sanity_check")]
    pub sanity_check: bool,

    /// Words before "law" that never name a jurisdiction
    pub generic_law_terms: Vec<String>,

    /// Groups of interchangeable jurisdiction names
    pub jurisdiction_aliases: Vec<Vec<String>>,
}

fn default_sanity_check() -> bool {
    true
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.85,
            grounding_threshold: 0.70,
            min_quote_word_len: 3,
            sanity_check: true,
            generic_law_terms: [
                "governing", "applicable", "relevant", "local", "the", "this", "such", "any",
                "all", "common", "case", "contract", "statutory", "mandatory", "national",
                "international", "federal", "state", "domestic", "foreign", "other", "that",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            jurisdiction_aliases: vec![
                aliases(&["UK", "United Kingdom", "England", "English", "England and Wales", "British"]),
                aliases(&["UAE", "United Arab Emirates", "Emirati"]),
                aliases(&["US", "USA", "United States", "American"]),
                aliases(&["New York", "NY"]),
                aliases(&["DIFC", "Dubai International Financial Centre"]),
                aliases(&["ADGM", "Abu Dhabi Global Market"]),
                aliases(&["Scotland", "Scottish", "Scots"]),
                aliases(&["Germany", "German"]),
                aliases(&["France", "French"]),
                aliases(&["Switzerland", "Swiss"]),
                aliases(&["Singapore", "Singaporean"]),
                aliases(&["India", "Indian"]),
                aliases(&["Saudi Arabia", "KSA", "Saudi"]),
            ],
        }
    }
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl VerifierConfig {
    /// Strict preset: higher bars for confidence and grounding
    pub fn strict() -> Self {
        Self {
            confidence_threshold: 0.90,
            grounding_threshold: 0.85,
            ..Self::default()
        }
    }

    /// Permissive preset: lower bars, sanity gate still on
    pub fn permissive() -> Self {
        Self {
            confidence_threshold: 0.75,
            grounding_threshold: 0.60,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        if !(self.grounding_threshold > 0.0 && self.grounding_threshold <= 1.0) {
            return Err(format!(
                "grounding_threshold must be in (0, 1], got {}",
                self.grounding_threshold
            ));
        }
        if self.min_quote_word_len == 0 {
            return Err("min_quote_word_len must be greater than 0".to_string());
        }
        if self.jurisdiction_aliases.iter().any(|group| group.is_empty()) {
            return Err("jurisdiction_aliases must not contain empty groups".to_string());
        }
        Ok(())
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
