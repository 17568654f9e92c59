//! JSON object extraction from model responses.

use serde_json::{Map, Value};

use crate::output_parser::error::{truncate, ParseError};
use crate::output_parser::extract::{extract_json_fence, outer_braces};

/// Pick the substring that should hold the response's JSON object.
///
/// Strategies (in order):
/// 1. Interior of a `` ```json `` fence
/// 2. First `{` through last `}`
///
/// A fence wins even if its interior turns out to be invalid; there is no
/// fallback to the brace span in that case.
pub fn locate_json_object(response: &str) -> Result<&str, ParseError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    if let Some(content) = extract_json_fence(trimmed) {
        return Ok(content);
    }

    outer_braces(trimmed).ok_or_else(|| ParseError::NoJsonObject {
        text: truncate(trimmed, 200),
    })
}

/// Locate and parse the single JSON object in a model response.
///
/// # Examples
///
/// ```
/// use soul_curator::output_parser::parse_json_object;
///
/// let response = "Here you go:\n```json\n{\"summary\": \"A stairway\", \"facts\": []}\n```";
/// let object = parse_json_object(response).unwrap();
/// assert_eq!(object["summary"], "A stairway");
///
/// assert!(parse_json_object("no object at all").is_err());
/// ```
pub fn parse_json_object(response: &str) -> Result<Map<String, Value>, ParseError> {
    let candidate = locate_json_object(response)?;

    let value: Value =
        serde_json::from_str(candidate).map_err(|e| ParseError::InvalidJson {
            reason: e.to_string(),
            raw_json: truncate(candidate, 200),
        })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "summary": "피란민의 애환이 서린 계단",
            "facts": ["1950년대 피란민", "영도다리"],
            "nested": {"depth": 2, "list": [1, {"x": null}]}
        })
    }

    #[test]
    fn bare_object() {
        let map = parse_json_object(r#"{"key": "value"}"#).unwrap();
        assert_eq!(map["key"], "value");
    }

    #[test]
    fn object_in_fence_recovers_original() {
        let original = sample();
        let response = format!(
            "Of course! Here is the data.\n```json\n{}\n```\nLet me know.",
            serde_json::to_string_pretty(&original).unwrap()
        );
        let map = parse_json_object(&response).unwrap();
        assert_eq!(Value::Object(map), original);
    }

    #[test]
    fn object_in_prose_recovers_original() {
        let original = sample();
        let response = format!("The result is {} -- enjoy.", original);
        let map = parse_json_object(&response).unwrap();
        assert_eq!(Value::Object(map), original);
    }

    #[test]
    fn fence_preferred_over_prose_braces() {
        let response = "Note {not json}\n```json\n{\"a\": 1}\n```";
        let map = parse_json_object(response).unwrap();
        assert_eq!(map["a"], 1);
    }

    #[test]
    fn invalid_fence_does_not_fall_back() {
        let response = "```json\n{broken\n```\n{\"a\": 1}";
        let err = parse_json_object(response).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }

    #[test]
    fn no_braces_is_an_error() {
        let err = parse_json_object("I could not find anything.").unwrap_err();
        assert!(matches!(err, ParseError::NoJsonObject { .. }));
    }

    #[test]
    fn empty_response_is_an_error() {
        assert!(matches!(
            parse_json_object("   \n").unwrap_err(),
            ParseError::EmptyResponse
        ));
    }

    #[test]
    fn unparseable_span_is_an_error() {
        let err = parse_json_object("{ this is not json }").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }

    #[test]
    fn two_objects_in_prose_fail_rather_than_guess() {
        let err = parse_json_object(r#"{"a": 1} or maybe {"b": 2}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }

    #[test]
    fn fenced_array_is_not_an_object() {
        let err = parse_json_object("```json\n[1, 2]\n```").unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject { found: "array" }));
    }

    #[test]
    fn locate_returns_fence_interior() {
        assert_eq!(
            locate_json_object("```json\n{\"a\": 1}\n```").unwrap(),
            "{\"a\": 1}"
        );
    }
}
