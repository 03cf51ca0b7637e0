//! Override, stub and table-of-contents detection

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use aho_corasick::AhoCorasick;
use covenant_domain::Clause;
use regex::Regex;

/// Flags precedence clauses, content-free stubs and TOC artifacts
pub struct Detector {
    overrides: AhoCorasick,
    preamble_phrases: Vec<String>,
    preamble_tail_min_chars: usize,
    stub_word_threshold: usize,
    operators: Regex,
    definition: Regex,
    toc_line: Regex,
    toc_phrases: Vec<String>,
    toc_headings: Vec<String>,
}

impl Detector {
    /// Compile detection rules from configuration
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        let overrides = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(config.override_phrases.iter().filter(|p| !p.trim().is_empty()))?;

        let operators: Vec<String> = config
            .legal_operators
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();
        if operators.is_empty() {
            return Err(ExtractorError::Config("legal_operators must not be empty".to_string()));
        }

        Ok(Self {
            overrides,
            preamble_phrases: lowercase(&config.preamble_phrases),
            preamble_tail_min_chars: config.preamble_tail_min_chars,
            stub_word_threshold: config.stub_word_threshold,
            operators: Regex::new(&format!(r"(?i)\b(?:{})\b", operators.join("|")))?,
            definition: Regex::new(
                r#"(?i)(?:["“][^"“”\n]{1,80}["”]|‘[^‘’\n]{1,80}’)\s*,?\s*(?:means|refers to|includes?|shall mean|has the meaning)\b"#,
            )?,
            toc_line: Regex::new(
                r"^\d{1,3}(?:\.\d{1,3})*[.)]?\s+[A-Z][A-Z ,&'/\-]*[A-Z](?:\s*\.{2,}\s*|\t+\s*|\s+)\d{1,4}$",
            )?,
            toc_phrases: lowercase(&config.toc_phrases),
            toc_headings: lowercase(&config.toc_headings),
        })
    }

    /// Whether the text asserts precedence over other provisions
    pub fn is_override(&self, text: &str) -> bool {
        self.overrides.is_match(text)
    }

    /// Whether the text is a heading-only or content-free clause
    pub fn is_stub(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.ends_with(':') {
            return true;
        }

        let lower = trimmed.to_lowercase();
        for phrase in &self.preamble_phrases {
            if let Some(idx) = lower.find(phrase.as_str()) {
                let tail = lower[idx + phrase.len()..].trim();
                if tail.chars().count() < self.preamble_tail_min_chars {
                    return true;
                }
            }
        }

        trimmed.split_whitespace().count() < self.stub_word_threshold
            && !self.operators.is_match(trimmed)
            && !self.definition.is_match(trimmed)
    }

    /// Whether the text is a table-of-contents artifact
    pub fn is_toc(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }

        let lower = trimmed.to_lowercase();
        if self.toc_phrases.iter().any(|p| lower.contains(p.as_str())) {
            return true;
        }

        let lines: Vec<&str> = trimmed
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        if let Some(first) = lines.first() {
            let heading = first
                .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
                .trim()
                .trim_end_matches(':')
                .to_lowercase();
            if self.toc_headings.iter().any(|h| *h == heading) {
                return true;
            }
        }

        if lines.len() == 1 && self.toc_line.is_match(lines[0]) {
            return true;
        }

        // Heading line followed by a bare page number
        lines.len() == 2
            && lines[1].len() <= 4
            && lines[1].chars().all(|c| c.is_ascii_digit())
            && lines[0].split_whitespace().count() <= 10
            && !lines[0].ends_with(['.', ';'])
    }

    /// Set the three flags on every clause from its own body
    pub fn apply(&self, clauses: &mut [Clause]) {
        for clause in clauses.iter_mut() {
            let body = clause.body();
            let is_override = self.is_override(body);
            let is_stub = self.is_stub(body);
            let is_toc = self.is_toc(body);

            clause.is_override = is_override;
            clause.is_stub = is_stub;
            clause.is_toc = is_toc;
        }
    }
}

fn lowercase(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
