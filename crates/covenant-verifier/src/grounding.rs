//! Locating oracle quotes inside clause text

use covenant_domain::GroundedQuote;

/// A normalized word and its byte span in the original text
#[derive(Debug, Clone, PartialEq)]
struct Word {
    norm: String,
    start: usize,
    end: usize,
}

/// Split text into lowercase words with surrounding punctuation trimmed
fn words(text: &str) -> Vec<Word> {
    let mut out = Vec::new();
    let mut token_start = None;

    for (i, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        match (c.is_whitespace(), token_start) {
            (false, None) => token_start = Some(i),
            (true, Some(start)) => {
                push_word(&mut out, text, start, i);
                token_start = None;
            }
            _ => {}
        }
    }

    out
}

fn push_word(out: &mut Vec<Word>, text: &str, start: usize, end: usize) {
    let token = &text[start..end];
    let trimmed = token.trim_matches(|c: char| !c.is_alphanumeric());
    if trimmed.is_empty() {
        return;
    }
    let offset = token.len() - token.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
    out.push(Word {
        norm: trimmed.to_lowercase(),
        start: start + offset,
        end: start + offset + trimmed.len(),
    });
}

/// Order-preserving fuzzy matcher for quotes
///
/// Quote words are matched against the clause words in one left-to-right
/// pass. A quote word that cannot be found consumes the rest of the clause,
/// so every later quote word fails too.
#[derive(Debug, Clone)]
pub struct Grounder {
    threshold: f64,
    min_word_len: usize,
}

impl Grounder {
    /// Create a grounder
    pub fn new(threshold: f64, min_word_len: usize) -> Self {
        Self {
            threshold,
            min_word_len,
        }
    }

    /// Words of the quote that take part in matching
    fn quote_words(&self, quote: &str) -> Vec<Word> {
        words(quote)
            .into_iter()
            .filter(|w| {
                w.norm.chars().count() >= self.min_word_len
                    || w.norm.chars().any(|c| c.is_ascii_digit())
            })
            .collect()
    }

    /// Match a quote against clause text, whatever the ratio
    ///
    /// Returns `None` when the quote has no usable words. Offsets are byte
    /// offsets into `clause_text`, spanning the first to the last matched
    /// word (both zero when nothing matched).
    pub fn locate(&self, quote: &str, clause_text: &str) -> Option<GroundedQuote> {
        let wanted = self.quote_words(quote);
        if wanted.is_empty() {
            return None;
        }

        let haystack = words(clause_text);
        let mut cursor = haystack.iter();
        let mut matched = 0;
        let mut span: Option<(usize, usize)> = None;

        for word in &wanted {
            if let Some(found) = cursor.by_ref().find(|w| w.norm == word.norm) {
                matched += 1;
                span = Some(match span {
                    Some((start, _)) => (start, found.end),
                    None => (found.start, found.end),
                });
            }
        }

        let (start, end) = span.unwrap_or((0, 0));
        Some(GroundedQuote {
            text: quote.to_string(),
            start,
            end,
            match_ratio: matched as f64 / wanted.len() as f64,
        })
    }

    /// Match a quote and keep it only if it clears the threshold
    pub fn ground(&self, quote: &str, clause_text: &str) -> Option<GroundedQuote> {
        self.locate(quote, clause_text)
            .filter(|q| q.match_ratio >= self.threshold)
    }

    /// Minimum accepted match ratio
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLAUSE: &str = "The Client shall make payment within 30 days of invoice date, without set-off.";

    fn grounder() -> Grounder {
        Grounder::new(0.7, 3)
    }

    #[test]
    fn test_words_trim_punctuation() {
        let w = words("  Net 30, (days).");
        let norms: Vec<&str> = w.iter().map(|w| w.norm.as_str()).collect();
        assert_eq!(norms, vec!["net", "30", "days"]);
        assert_eq!(&"  Net 30, (days)."[w[2].start..w[2].end], "days");
    }

    #[test]
    fn test_exact_quote_grounds() {
        let quote = grounder().ground("payment within 30 days", CLAUSE).unwrap();
        assert_eq!(quote.match_ratio, 1.0);
        assert_eq!(&CLAUSE[quote.start..quote.end], "payment within 30 days");
    }

    #[test]
    fn test_wrong_number_fails() {
        let located = grounder().locate("payment within 90 days", CLAUSE).unwrap();
        assert_eq!(located.match_ratio, 0.5);
        assert!(grounder().ground("payment within 90 days", CLAUSE).is_none());
    }

    #[test]
    fn test_gaps_and_case_allowed() {
        let quote = grounder()
            .ground("Client shall make PAYMENT within 30 days of invoice date", CLAUSE)
            .unwrap();
        // "of" is below the word-length floor and ignored
        assert_eq!(quote.match_ratio, 1.0);
    }

    #[test]
    fn test_order_matters() {
        let located = grounder().locate("invoice date payment", CLAUSE).unwrap();
        assert!(located.match_ratio < 0.7);
    }

    #[test]
    fn test_short_numeric_quote() {
        let clause = "4.1 Payment due Net 30.";
        let quote = grounder().ground("Net 30", clause).unwrap();
        assert_eq!(&clause[quote.start..quote.end], "Net 30");
    }

    #[test]
    fn test_no_usable_words() {
        assert!(grounder().locate("", CLAUSE).is_none());
        assert!(grounder().locate("of a", CLAUSE).is_none());
        assert!(grounder().locate("...", CLAUSE).is_none());
    }

    #[test]
    fn test_nothing_matched() {
        let located = grounder().locate("arbitration seat", CLAUSE).unwrap();
        assert_eq!(located.match_ratio, 0.0);
        assert_eq!((located.start, located.end), (0, 0));
    }

    #[test]
    fn test_multibyte_offsets() {
        let clause = "Zahlung binnen 30 Tagen, größer als €500.";
        let quote = grounder().ground("größer als", clause).unwrap();
        assert_eq!(&clause[quote.start..quote.end], "größer als");
    }
}
