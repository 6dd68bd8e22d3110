//! Decoding of raw source response bodies.
//!
//! A body that is not JSON, or JSON of the wrong shape, is a
//! [`FetchError::Parse`] carrying an excerpt of the body.

use serde_json::Value;

use crate::domain::{count_from_json, FetchError, FetchResult, LanguageBytes, PreciseRecord};

/// Decode a fast-source body: a JSON object of language → byte count.
///
/// Byte values that are negative or not numbers count as 0.
pub fn decode_language_bytes(body: &str) -> FetchResult<LanguageBytes> {
    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::parse(e, body))?;
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(language, bytes)| (language.as_str(), count_from_json(bytes)))
            .collect()),
        other => Err(FetchError::parse(
            format!("expected a JSON object, got {}", kind(&other)),
            body,
        )),
    }
}

/// Decode a precise-source body: a JSON array of per-language records.
pub fn decode_precise_records(body: &str) -> FetchResult<Vec<PreciseRecord>> {
    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::parse(e, body))?;
    if !value.is_array() {
        return Err(FetchError::parse(
            format!("expected a JSON array, got {}", kind(&value)),
            body,
        ));
    }
    serde_json::from_value(value).map_err(|e| FetchError::parse(e, body))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
