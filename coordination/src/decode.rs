//! Structured-response decoding shared by the outline and judge calls.
//!
//! Models frequently wrap JSON answers in markdown fences. Both call sites
//! strip the fence and parse in one step and get back a tagged result, so
//! the caller only decides what a failure means for it.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why a structured response could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("response is empty")]
    Empty,

    #[error("invalid JSON: {0}")]
    Json(String),
}

/// Remove an optional leading ```` ```json ```` / ```` ``` ```` fence and a
/// trailing ```` ``` ````, then trim.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Strip fences and parse `raw` as `T`.
pub fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    let cleaned = strip_code_fence(raw);
    if cleaned.is_empty() {
        return Err(DecodeError::Empty);
    }
    serde_json::from_str(cleaned).map_err(|e| DecodeError::Json(e.to_string()))
}
