//! Prompt construction for conflict classification

use crate::types::OracleRequest;

/// Builds the classification prompt for one clause pair
pub struct PromptBuilder<'a> {
    request: &'a OracleRequest,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder for a request
    pub fn new(request: &'a OracleRequest) -> Self {
        Self { request }
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(CLASSIFICATION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if !self.request.shared_topics.is_empty() {
            let topics: Vec<&str> = self.request.shared_topics.iter().map(String::as_str).collect();
            prompt.push_str(&format!("Shared topics: {}\n\n", topics.join(", ")));
        }

        prompt.push_str(&format!("Clause A ({}):\n", self.request.clause_a_label));
        prompt.push_str("---\n");
        prompt.push_str(self.request.clause_a_text.trim());
        prompt.push_str("\n---\n\n");

        prompt.push_str(&format!("Clause B ({}):\n", self.request.clause_b_label));
        prompt.push_str("---\n");
        prompt.push_str(self.request.clause_b_text.trim());
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT);

        prompt
    }
}

const CLASSIFICATION_INSTRUCTIONS: &str = r#"You are reviewing a contract for internal inconsistencies.
Decide whether the two clauses below impose obligations, rights, amounts, deadlines or
jurisdictions that cannot both be honoured at the same time.

Rules:
- Differences in wording that can be read together are NOT conflicts.
- A clause that explicitly takes precedence over the other still counts as a conflict
  if the two would otherwise contradict each other.
- Quote the exact words from each clause that support your answer. Do not paraphrase.
- Only mention numbers, dates and places in your summary if they appear in the clauses."#;

const OUTPUT_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{
  "is_conflict": true or false,
  "confidence": number between 0.0 and 1.0,
  "severity": "LOW" | "MEDIUM" | "HIGH" | "CRITICAL",
  "summary": "one sentence",
  "explanation": "short reasoning",
  "quote_a": "exact words from clause A",
  "quote_b": "exact words from clause B"
}"#;
