// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of untrusted marker payloads.
//!
//! The cache and both remote sources hand back serialized JSON. Every read
//! goes through [`MarkerRecord::decode`] so a malformed or partially written
//! payload is rejected at the boundary instead of reaching the AR renderer.

use serde_json::Value;
use thiserror::Error;

use crate::types::MarkerRecord;

/// Why a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerDecodeError {
    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing `{0}`")]
    MissingField(&'static str),

    #[error("`{0}` is not a string")]
    NotAString(&'static str),

    #[error("`{field}` is not an http(s) URL: {value}")]
    NotHttp { field: &'static str, value: String },
}

/// Returns true if `url` starts with an `http://` or `https://` scheme.
pub fn is_http_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn required_url(
    map: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<String, MarkerDecodeError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(MarkerDecodeError::MissingField(field)),
        Some(Value::String(s)) if is_http_url(s) => Ok(s.clone()),
        Some(Value::String(s)) => Err(MarkerDecodeError::NotHttp {
            field,
            value: s.clone(),
        }),
        Some(_) => Err(MarkerDecodeError::NotAString(field)),
    }
}

fn optional_url(
    map: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, MarkerDecodeError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => required_url(map, field).map(Some),
    }
}

impl MarkerRecord {
    /// Decode an untyped payload into a validated record.
    ///
    /// `imageUrl` and `videoUrl` are required http(s) URLs; `patternUrl` is
    /// optional but must be an http(s) URL when present. Unknown keys such
    /// as `cachedAt` or `createdAt` are ignored.
    pub fn decode(value: &Value) -> Result<MarkerRecord, MarkerDecodeError> {
        let map = value.as_object().ok_or(MarkerDecodeError::NotAnObject)?;
        Ok(MarkerRecord {
            image_url: required_url(map, "imageUrl")?,
            video_url: required_url(map, "videoUrl")?,
            pattern_url: optional_url(map, "patternUrl")?,
        })
    }
}

/// Shape predicate over an arbitrary payload.
pub fn is_valid_marker_data(candidate: &Value) -> bool {
    MarkerRecord::decode(candidate).is_ok()
}
