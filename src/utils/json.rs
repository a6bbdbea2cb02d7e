//! Helpers for structured payloads returned by a text-completion provider.
//!
//! Models are asked for strict JSON but frequently wrap it in markdown code
//! fences. Every payload is treated as untrusted text: strip the fences, then
//! parse, and let the caller fall back on any error.

use crate::types::{AppError, Result};
use serde::de::DeserializeOwned;

/// Remove leading/trailing markdown code-fence markers (```` ```json ```` or ```` ``` ````).
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // Drop the info string ("json", "JSON", ...) up to the first newline
        body = match rest.find('\n') {
            Some(idx) if rest[..idx].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[idx + 1..],
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }

    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Parse a provider response as a JSON object of type `T`.
pub fn parse_json_payload<T: DeserializeOwned>(text: &str) -> Result<T> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(AppError::Parse("Empty JSON payload".to_string()));
    }
    serde_json::from_str(body).map_err(|e| AppError::Parse(format!("Invalid JSON payload: {}", e)))
}
