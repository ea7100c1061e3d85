//! Parsing of free-form model text into structured JSON.
//!
//! Models are asked to answer with "ONLY a JSON object" but routinely wrap
//! it in prose or a markdown fence. `extract_json` cuts the greedy
//! `{…}` span (first `{` to last `}`) and deserializes it. A missing or
//! unparseable span is an expected outcome, not an exceptional one, so
//! these functions return `Result` rather than panicking and are never
//! retried against the same output.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    /// No `{…}` span found, or the span is not valid JSON.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
    /// The JSON parsed but a required field is absent or empty.
    #[error("incomplete model response: missing field `{0}`")]
    IncompleteResponse(String),
}

/// Extract the greedy brace-matched JSON object embedded in `raw`.
pub fn extract_json(raw: &str) -> Result<Value, ResponseError> {
    let start = raw
        .find('{')
        .ok_or_else(|| ResponseError::MalformedResponse("no JSON object found".to_string()))?;
    let end = raw
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| ResponseError::MalformedResponse("no closing brace found".to_string()))?;

    serde_json::from_str(&raw[start..=end])
        .map_err(|e| ResponseError::MalformedResponse(e.to_string()))
}

/// Check that every named field is present and truthy (not null, not an
/// empty string, not `false`, not zero).
pub fn validate_required_fields(obj: &Value, fields: &[&str]) -> Result<(), ResponseError> {
    for field in fields {
        let truthy = match obj.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(_) => true,
        };
        if !truthy {
            return Err(ResponseError::IncompleteResponse(field.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_single_object_exactly() {
        let raw = r#"Sure! Here is the task:
```json
{"title": "Buy milk", "category": "shopping"}
```
Let me know if you need anything else."#;
        let value = extract_json(raw).unwrap();
        assert_eq!(value, json!({"title": "Buy milk", "category": "shopping"}));
    }

    #[test]
    fn bare_object_matches_direct_parse() {
        let raw = r#"{"a": 1, "b": {"c": 2}}"#;
        let direct: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_json(raw).unwrap(), direct);
    }

    #[test]
    fn no_brace_is_malformed() {
        let err = extract_json("I could not produce a task for that.").unwrap_err();
        assert!(matches!(err, ResponseError::MalformedResponse(_)));
    }

    #[test]
    fn unbalanced_span_is_malformed() {
        let err = extract_json("{\"title\": \"open").unwrap_err();
        assert!(matches!(err, ResponseError::MalformedResponse(_)));

        // Closing brace before the opening one
        let err = extract_json("} nothing {").unwrap_err();
        assert!(matches!(err, ResponseError::MalformedResponse(_)));
    }

    #[test]
    fn greedy_span_swallows_inner_objects() {
        let raw = r#"prefix {"outer": {"inner": true}} suffix"#;
        let value = extract_json(raw).unwrap();
        assert_eq!(value["outer"]["inner"], json!(true));
    }

    #[test]
    fn required_fields_accept_truthy_values() {
        let obj = json!({"title": "x", "minutes": 30, "flag": true});
        assert!(validate_required_fields(&obj, &["title", "minutes", "flag"]).is_ok());
    }

    #[test]
    fn required_fields_reject_absent_null_and_empty() {
        let obj = json!({"title": "", "due": null, "n": 0});
        for field in ["title", "due", "n", "missing"] {
            let err = validate_required_fields(&obj, &[field]).unwrap_err();
            assert_eq!(err, ResponseError::IncompleteResponse(field.to_string()));
        }
    }
}
