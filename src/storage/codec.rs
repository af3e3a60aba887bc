//! Text encoding for composite result columns
//!
//! `links`, `images` and `headers` are stored as a single TEXT column each.
//!
//! # Format
//!
//! | column | encoding |
//! |--------|----------|
//! | `links`, `images` | JSON array of strings, in original order |
//! | `headers` | JSON object of string to string, keys sorted |
//!
//! A NULL or empty column decodes to an empty collection. Any other text
//! that is not valid JSON of the expected shape is reported as
//! `StorageError::Codec`. Decoding an encoded value always yields the
//! original value.

use crate::storage::traits::{StorageError, StorageResult};
use std::collections::BTreeMap;

/// Encodes an ordered list of strings
pub fn encode_list(items: &[String]) -> String {
    // Serializing a slice of strings cannot fail
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decodes a list column written by [`encode_list`]
pub fn decode_list(column: &'static str, text: Option<&str>) -> StorageResult<Vec<String>> {
    match text.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| StorageError::Codec {
            column,
            message: e.to_string(),
        }),
    }
}

/// Encodes a header map
pub fn encode_headers(headers: &BTreeMap<String, String>) -> String {
    serde_json::to_string(headers).unwrap_or_else(|_| "{}".to_string())
}

/// Decodes a header column written by [`encode_headers`]
pub fn decode_headers(text: Option<&str>) -> StorageResult<BTreeMap<String, String>> {
    match text.map(str::trim) {
        None | Some("") => Ok(BTreeMap::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| StorageError::Codec {
            column: "headers",
            message: e.to_string(),
        }),
    }
}
