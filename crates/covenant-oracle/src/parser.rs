//! Parse oracle output into a response

use crate::error::OracleError;
use crate::types::OracleResponse;
use covenant_domain::Severity;
use serde_json::{Map, Value};

/// Parse the oracle's raw text into a response
///
/// Lenient about presentation (code fences, surrounding prose, `"95%"`
/// confidences, lowercase severities), strict about shape: a missing verdict,
/// confidence or severity is an [`OracleError::InvalidResponse`].
pub fn parse_oracle_response(raw: &str) -> Result<OracleResponse, OracleError> {
    let json_str = extract_json(raw)?;

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| OracleError::InvalidResponse(format!("JSON parse error: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| OracleError::InvalidResponse("Expected JSON object".to_string()))?;

    let is_conflict = parse_bool(obj.get("is_conflict"))
        .ok_or_else(|| invalid("Missing or invalid 'is_conflict'"))?;

    let confidence = parse_confidence(obj.get("confidence"))
        .ok_or_else(|| invalid("Missing or invalid 'confidence'"))?;

    let severity = obj
        .get("severity")
        .and_then(|v| v.as_str())
        .and_then(Severity::parse)
        .ok_or_else(|| invalid("Missing or invalid 'severity'"))?;

    Ok(OracleResponse {
        is_conflict,
        confidence,
        severity,
        summary: string_field(obj, "summary"),
        explanation: string_field(obj, "explanation"),
        quote_a: string_field(obj, "quote_a"),
        quote_b: string_field(obj, "quote_b"),
    })
}

/// Extract the JSON object from a response, handling markdown code blocks
fn extract_json(raw: &str) -> Result<&str, OracleError> {
    let trimmed = raw.trim();

    let body = if trimmed.starts_with("```") {
        let after_fence = trimmed
            .find('\n')
            .map(|i| &trimmed[i + 1..])
            .ok_or_else(|| invalid("Empty code block"))?;
        after_fence.trim_end().trim_end_matches("```")
    } else {
        trimmed
    };

    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&body[start..=end]),
        _ => Err(invalid("No JSON object in response")),
    }
}

fn parse_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_confidence(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_suffix('%') {
                Some(percent) => percent.trim().parse::<f64>().ok().map(|p| p / 100.0),
                None => s.parse::<f64>().ok(),
            }
        }
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn invalid(message: &str) -> OracleError {
    OracleError::InvalidResponse(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let raw = r#"{
            "is_conflict": true,
            "confidence": 0.95,
            "severity": "HIGH",
            "summary": "Payment terms differ: 30 vs 60 days",
            "explanation": "Clause A requires Net 30, clause B Net 60.",
            "quote_a": "Net 30",
            "quote_b": "Net 60"
        }"#;

        let response = parse_oracle_response(raw).unwrap();
        assert!(response.is_conflict);
        assert_eq!(response.confidence, 0.95);
        assert_eq!(response.severity, Severity::High);
        assert_eq!(response.quote_a, "Net 30");
        assert_eq!(response.quote_b, "Net 60");
    }

    #[test]
    fn test_parse_code_fence() {
        let raw = "```json\n{\"is_conflict\": false, \"confidence\": 0.9, \"severity\": \"low\"}\n```";
        let response = parse_oracle_response(raw).unwrap();
        assert!(!response.is_conflict);
        assert_eq!(response.severity, Severity::Low);
        assert!(response.quote_a.is_empty());
    }

    #[test]
    fn test_parse_surrounding_prose() {
        let raw = "Here is my answer: {\"is_conflict\": \"yes\", \"confidence\": \"87%\", \"severity\": \"Critical\"} Hope that helps.";
        let response = parse_oracle_response(raw).unwrap();
        assert!(response.is_conflict);
        assert!((response.confidence - 0.87).abs() < 1e-9);
        assert_eq!(response.severity, Severity::Critical);
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let missing_verdict = r#"{"confidence": 0.9, "severity": "LOW"}"#;
        assert!(matches!(
            parse_oracle_response(missing_verdict),
            Err(OracleError::InvalidResponse(_))
        ));

        let bad_severity = r#"{"is_conflict": true, "confidence": 0.9, "severity": "apocalyptic"}"#;
        assert!(parse_oracle_response(bad_severity).is_err());
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_oracle_response("I cannot help with that.").is_err());
        assert!(parse_oracle_response("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_out_of_range_confidence_is_passed_through() {
        // Range checks belong to the verifier
        let raw = r#"{"is_conflict": true, "confidence": 7, "severity": "LOW"}"#;
        assert_eq!(parse_oracle_response(raw).unwrap().confidence, 7.0);
    }
}
