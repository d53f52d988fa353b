//! Portable export tokens: base64 over the record JSON.

use crate::{
    error::{SimError, SimResult},
    record::SaveRecord,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

pub fn encode(record: &SaveRecord) -> SimResult<String> {
    let json = serde_json::to_string(record)?;
    Ok(STANDARD.encode(json))
}

/// Decode to raw JSON. Shape and version checks happen in migration.
pub fn decode(token: &str) -> SimResult<Value> {
    // Pasted tokens often pick up line breaks.
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(SimError::corrupt("empty token"));
    }
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SimError::corrupt(format!("token is not base64: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| SimError::corrupt(format!("token is not utf-8: {e}")))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| SimError::corrupt(format!("token is not json: {e}")))?;
    if !value.is_object() {
        return Err(SimError::corrupt("token does not hold a record"));
    }
    Ok(value)
}
