//! JSON (de)serialization for [`ParseResult`] documents.
//!
//! Output is plain UTF-8 JSON; non-Latin text is written as-is, not escaped.

use crate::model::ParseResult;
use anyhow::{Context, Result};

/// Serialize one result to a pretty-printed JSON string.
pub fn to_json(result: &ParseResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize parse result to JSON")
}

/// Serialize one result to a single-line JSON string.
pub fn to_json_compact(result: &ParseResult) -> Result<String> {
    serde_json::to_string(result).context("failed to serialize parse result to JSON")
}

/// Deserialize one result from a JSON string.
pub fn from_json(json: &str) -> Result<ParseResult> {
    serde_json::from_str(json).context("failed to deserialize parse result from JSON")
}

/// Serialize a batch of results as a JSON array.
pub fn batch_to_json(results: &[ParseResult], pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(results)
    } else {
        serde_json::to_string(results)
    };
    out.context("failed to serialize parse results to JSON")
}

/// Deserialize a JSON array of results.
pub fn batch_from_json(json: &str) -> Result<Vec<ParseResult>> {
    serde_json::from_str(json).context("failed to deserialize parse results from JSON")
}
