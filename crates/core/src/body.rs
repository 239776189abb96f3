//! Request body decoding.
//!
//! Write requests carry their payload either as plain JSON text or as base64
//! of that text, signalled by the event's `isBase64Encoded` flag.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use thiserror::Error;

use crate::storage::Item;

/// Errors that can occur while decoding a request body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BodyError {
    #[error("Request body is missing")]
    Missing,
    #[error("Request body is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("Request body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("Request body must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("Request body has no attributes to update")]
    NoAttributes,
}

/// Decodes a raw request body into an attribute mapping.
pub fn decode_body(raw: Option<&str>, is_base64_encoded: bool) -> Result<Item, BodyError> {
    let raw = raw.ok_or(BodyError::Missing)?;

    let value: Value = if is_base64_encoded {
        let bytes = STANDARD.decode(raw.trim())?;
        serde_json::from_slice(&bytes).map_err(|e| BodyError::InvalidJson(e.to_string()))?
    } else {
        serde_json::from_str(raw).map_err(|e| BodyError::InvalidJson(e.to_string()))?
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(BodyError::NotAnObject(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(value: &Value) -> String {
        STANDARD.encode(serde_json::to_vec(value).unwrap())
    }

    #[test]
    fn test_decode_plain_json() {
        let item = decode_body(Some(r#"{"name":"widget","qty":3}"#), false).unwrap();
        assert_eq!(item["name"], "widget");
        assert_eq!(item["qty"], 3);
    }

    #[test]
    fn test_decode_base64_round_trip() {
        let original = json!({
            "name": "widget",
            "qty": 3,
            "price": 9.5,
            "tags": ["a", "b"],
            "dimensions": {"w": 1, "h": 2},
            "discontinued": false,
            "notes": null
        });

        let item = decode_body(Some(&encode(&original)), true).unwrap();

        assert_eq!(Value::Object(item), original);
    }

    #[test]
    fn test_decode_keeps_numbers_exact() {
        let raw = r#"{"big":123456789012345678901234567890,"fine":0.12345678901234567890123}"#;

        let item = decode_body(Some(&STANDARD.encode(raw)), true).unwrap();

        assert_eq!(item["big"].to_string(), "123456789012345678901234567890");
        assert_eq!(item["fine"].to_string(), "0.12345678901234567890123");
        assert_eq!(serde_json::to_string(&item).unwrap(), raw);
    }

    #[test]
    fn test_decode_empty_object() {
        let item = decode_body(Some("{}"), false).unwrap();
        assert!(item.is_empty());
    }

    #[test]
    fn test_missing_body_is_rejected() {
        assert_eq!(decode_body(None, false), Err(BodyError::Missing));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let result = decode_body(Some("not base64!!"), true);
        assert!(matches!(result, Err(BodyError::InvalidBase64(_))));
    }

    #[test]
    fn test_base64_of_invalid_json_is_rejected() {
        let raw = STANDARD.encode("{not json");
        let result = decode_body(Some(&raw), true);
        assert!(matches!(result, Err(BodyError::InvalidJson(_))));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let result = decode_body(Some("{\"name\":"), false);
        assert!(matches!(result, Err(BodyError::InvalidJson(_))));
    }

    #[test]
    fn test_scalar_is_rejected() {
        assert_eq!(
            decode_body(Some("42"), false),
            Err(BodyError::NotAnObject("a number"))
        );
    }

    #[test]
    fn test_array_is_rejected() {
        assert_eq!(
            decode_body(Some(&encode(&json!([1, 2]))), true),
            Err(BodyError::NotAnObject("an array"))
        );
    }

    #[test]
    fn test_plain_body_is_not_base64_decoded() {
        // Valid base64 text that is not flagged must be parsed as JSON directly.
        let raw = encode(&json!({"a": 1}));
        let result = decode_body(Some(&raw), false);
        assert!(matches!(result, Err(BodyError::InvalidJson(_))));
    }
}
