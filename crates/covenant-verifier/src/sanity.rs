//! Fabricated-specifics check for oracle summaries
//!
//! An oracle can quote two real fragments and still summarise them with a
//! number, date or governing law that appears nowhere in either clause. The
//! checker pulls those specifics out of the summary and looks for each one,
//! in any recognizable form, in the source text.

use crate::config::VerifierConfig;
use crate::error::VerifierError;
use regex::Regex;
use std::collections::HashSet;

const UNITS: &str = r"(?:(?:business|calendar|working)\s+)?(?:days?|weeks?|months?|years?|hours?)\b";
const MONTHS: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";
const CURRENCY_CODES: &str = "usd|eur|gbp|aed|sar|chf";

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Looks for summary specifics that the source text does not support
pub struct SanityChecker {
    /// Patterns whose first capture group is a number
    numeric: Vec<Regex>,
    word_quantity: Regex,
    source_number: Regex,
    law_before: Regex,
    law_after: Regex,
    generic: HashSet<String>,
    aliases: Vec<Vec<String>>,
}

impl SanityChecker {
    /// Compile the checker
    pub fn new(config: &VerifierConfig) -> Result<Self, VerifierError> {
        let number = r"(\d[\d,]*(?:\.\d+)?)";
        let numeric = vec![
            // 30 days, 30-day, 5%, 2.5 percent
            Regex::new(&format!(r"(?i)\b{number}\s*-?\s*(?:{UNITS}|%|per\s?cent\b)"))?,
            // $5,000, USD 5000
            Regex::new(&format!(r"(?i)(?:[$€£]|\b(?:{CURRENCY_CODES})\b)\s*{number}"))?,
            // 5,000 USD, 200 dollars
            Regex::new(&format!(
                r"(?i)\b{number}\s*(?:(?:{CURRENCY_CODES})\b|dollars?\b|euros?\b|pounds?\b|dirhams?\b)"
            ))?,
            // 1st January, 1 of March
            Regex::new(&format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{MONTHS})\b"))?,
            // January 1
            Regex::new(&format!(r"(?i)\b(?:{MONTHS})\s+(\d{{1,2}})\b"))?,
            // years
            Regex::new(r"\b((?:19|20)\d{2})\b")?,
        ];

        let tens = TENS[2..].join("|");
        let units_digits = ONES[1..10].join("|");
        let teens = ONES[10..].join("|");
        let ones = ONES[..10].join("|");
        let word_quantity = Regex::new(&format!(
            r"(?i)\b((?:{tens})(?:[\s-](?:{units_digits})\b)?|{teens}|{ones})\s+{UNITS}"
        ))?;

        let phrase = r"([A-Z][A-Za-z]*(?:\s+(?:and\s+)?[A-Z][A-Za-z]*){0,3})";
        let law_before = Regex::new(&format!(r"\b{phrase}\s+[Ll]aws?\b"))?;
        let law_after = Regex::new(&format!(r"\b[Ll]aws?\s+of\s+(?:the\s+)?{phrase}"))?;

        Ok(Self {
            numeric,
            word_quantity,
            source_number: Regex::new(r"\d[\d,]*(?:\.\d+)?")?,
            law_before,
            law_after,
            generic: config
                .generic_law_terms
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            aliases: config
                .jurisdiction_aliases
                .iter()
                .map(|group| group.iter().map(|n| n.to_lowercase()).collect())
                .collect(),
        })
    }

    /// First summary specific not supported by `source`, if any
    pub fn check(&self, summary: &str, source: &str) -> Option<String> {
        self.unsupported(summary, source).into_iter().next()
    }

    /// Every summary specific not supported by `source`
    pub fn unsupported(&self, summary: &str, source: &str) -> Vec<String> {
        let source_lower = source.to_lowercase();
        let source_numbers: HashSet<String> = self
            .source_number
            .find_iter(source)
            .map(|m| normalize_number(m.as_str()))
            .collect();

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut report = |term: &str| {
            if seen.insert(term.to_string()) {
                out.push(term.to_string());
            }
        };

        for pattern in &self.numeric {
            for caps in pattern.captures_iter(summary) {
                let (Some(term), Some(value)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let value = normalize_number(value.as_str());
                if !number_supported(&value, &source_numbers, &source_lower) {
                    report(term.as_str().trim());
                }
            }
        }

        for caps in self.word_quantity.captures_iter(summary) {
            let (Some(term), Some(word)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(value) = parse_number_word(word.as_str()) else {
                continue;
            };
            if !number_supported(&value.to_string(), &source_numbers, &source_lower) {
                report(term.as_str().trim());
            }
        }

        for pattern in [&self.law_before, &self.law_after] {
            for caps in pattern.captures_iter(summary) {
                let Some(name) = caps.get(1) else { continue };
                if let Some(jurisdiction) = self.jurisdiction(name.as_str()) {
                    if !self.jurisdiction_supported(&jurisdiction, &source_lower) {
                        report(&jurisdiction);
                    }
                }
            }
        }

        out
    }

    /// Strip generic leading words; `None` when nothing specific remains
    fn jurisdiction(&self, phrase: &str) -> Option<String> {
        let words: Vec<&str> = phrase
            .split_whitespace()
            .skip_while(|w| self.generic.contains(&w.to_lowercase()))
            .collect();
        if words.is_empty() || words.iter().all(|w| self.generic.contains(&w.to_lowercase())) {
            return None;
        }
        Some(words.join(" "))
    }

    /// Any trailing run of the name, or an alias of it, occurs in the source
    fn jurisdiction_supported(&self, name: &str, source_lower: &str) -> bool {
        let words: Vec<String> = name.split_whitespace().map(|w| w.to_lowercase()).collect();
        (0..words.len()).any(|skip| {
            let candidate = words[skip..].join(" ");
            if candidate == "and" {
                return false;
            }
            self.forms_of(&candidate)
                .iter()
                .any(|form| contains_phrase(source_lower, form))
        })
    }

    fn forms_of(&self, name: &str) -> Vec<String> {
        self.aliases
            .iter()
            .find(|group| group.iter().any(|alias| alias == name))
            .cloned()
            .unwrap_or_else(|| vec![name.to_string()])
    }
}

/// Strip thousands separators and leading zeros
fn normalize_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    if digits.contains('.') {
        return digits;
    }
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn number_supported(value: &str, source_numbers: &HashSet<String>, source_lower: &str) -> bool {
    if source_numbers.contains(value) {
        return true;
    }
    value
        .parse::<u32>()
        .ok()
        .map(number_words)
        .unwrap_or_default()
        .iter()
        .any(|word| contains_phrase(source_lower, word))
}

/// English spellings of 0-99
fn number_words(n: u32) -> Vec<String> {
    match n {
        0..=19 => vec![ONES[n as usize].to_string()],
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => vec![tens.to_string()],
                ones => {
                    let ones = ONES[ones as usize];
                    vec![format!("{}-{}", tens, ones), format!("{} {}", tens, ones)]
                }
            }
        }
        _ => Vec::new(),
    }
}

fn parse_number_word(word: &str) -> Option<u32> {
    let lower = word.to_lowercase().replace('-', " ");
    let parts: Vec<&str> = lower.split_whitespace().collect();

    match parts.as_slice() {
        [single] => position(&ONES, single)
            .map(|i| i as u32)
            .or_else(|| position(&TENS, single).filter(|i| *i >= 2).map(|i| i as u32 * 10)),
        [tens, ones] => {
            let t = position(&TENS, tens).filter(|i| *i >= 2)?;
            let o = position(&ONES, ones).filter(|i| (1..=9).contains(i))?;
            Some((t * 10 + o) as u32)
        }
        _ => None,
    }
}

fn position(table: &[&str], word: &str) -> Option<usize> {
    table.iter().position(|t| *t == word)
}

/// Whole-word substring search on lowercase text
fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> SanityChecker {
        SanityChecker::new(&VerifierConfig::default()).unwrap()
    }

    const SOURCE: &str = "4.1 Payment due Net 30.\n4.2 Payment due Net 60.";

    #[test]
    fn test_supported_numbers_pass() {
        let summary = "Payment terms differ: 30 days vs 60 days";
        assert!(checker().check(summary, SOURCE).is_none());
    }

    #[test]
    fn test_fabricated_number_rejected() {
        let summary = "Clause 4.1 requires payment within 45 days, clause 4.2 within 60 days";
        assert_eq!(checker().check(summary, SOURCE), Some("45 days".to_string()));
    }

    #[test]
    fn test_number_words_recognized() {
        let source = "Invoices are payable within thirty (30) days; notice of sixty days applies.";
        assert!(checker().check("30 days vs 60-day notice", source).is_none());
        assert!(checker().check("thirty days vs sixty days", "Net 30 or Net 60").is_none());
        assert!(checker().check("ninety days", "Net 30").is_some());
    }

    #[test]
    fn test_money_and_percent() {
        let source = "The cap is USD 5000. Late interest accrues at 2.5 percent.";
        assert!(checker().check("A cap of $5,000 with 2.5% interest", source).is_none());
        assert!(checker().check("A cap of $7,500", source).is_some());
        assert!(checker().check("interest of 4%", source).is_some());
    }

    #[test]
    fn test_dates() {
        let source = "This Agreement commences on January 1, 2025.";
        assert!(checker().check("Starts 1st January 2025", source).is_none());
        assert_eq!(checker().check("Starts 1 January 2026", source), Some("2026".to_string()));
    }

    #[test]
    fn test_jurisdictions() {
        let source = "9.1 Governing law is Abu Dhabi.";
        assert!(checker().check("Abu Dhabi law governs", source).is_none());
        assert_eq!(checker().check("Abu Dhabi law vs UK law", source), Some("UK".to_string()));
    }

    #[test]
    fn test_jurisdiction_aliases() {
        let source = "This Agreement is governed by the laws of England and Wales.";
        assert!(checker().check("English law applies", source).is_none());
        assert!(checker().check("Subject to UK law", source).is_none());
        assert!(checker().check("the laws of the United Arab Emirates", source).is_some());
    }

    #[test]
    fn test_generic_law_phrases_ignored() {
        let source = "Payment is due on delivery.";
        assert!(checker().check("Governing Law clauses differ on applicable law", source).is_none());
        assert!(checker().check("The governing law differs", source).is_none());
    }

    #[test]
    fn test_unsupported_lists_each_term_once() {
        let terms = checker().unsupported("45 days, then 45 days again, under Texas law", SOURCE);
        assert_eq!(terms, vec!["45 days".to_string(), "Texas".to_string()]);
    }

    #[test]
    fn test_number_word_helpers() {
        assert_eq!(parse_number_word("thirty"), Some(30));
        assert_eq!(parse_number_word("Twenty-one"), Some(21));
        assert_eq!(parse_number_word("seventeen"), Some(17));
        assert_eq!(parse_number_word("hundred"), None);
        assert_eq!(number_words(45), vec!["forty-five".to_string(), "forty five".to_string()]);
        assert!(number_words(100).is_empty());
    }

    #[test]
    fn test_contains_phrase_respects_word_boundaries() {
        assert!(contains_phrase("net 30 days", "30"));
        assert!(!contains_phrase("net 300 days", "30"));
        assert!(!contains_phrase("ukraine", "uk"));
    }
}
