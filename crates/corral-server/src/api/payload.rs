//! Request body parsing.
//!
//! Bodies are read as raw bytes so that malformed JSON is answered with the
//! service's own error shape rather than the extractor's plain-text
//! rejection.

use serde_json::{Map, Value};

use crate::api::error::{ApiError, api_bad_request};

/// Parse a request body that must be a JSON object.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(api_bad_request("request body must be a JSON object")),
        Err(e) => Err(api_bad_request(format!("malformed JSON: {e}"))),
    }
}

/// Read an optional string field. Absent and `null` both read as `None`;
/// any other non-string value is rejected.
pub fn string_field(map: &Map<String, Value>, key: &str) -> Result<Option<String>, ApiError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(api_bad_request(format!("field '{key}' must be a string"))),
    }
}
