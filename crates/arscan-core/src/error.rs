// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every arscan crate.

use std::time::Duration;

use thiserror::Error;

use crate::validation::MarkerDecodeError;

/// The primary error type used across all arscan traits and operations.
#[derive(Debug, Error)]
pub enum ArscanError {
    /// Configuration errors (invalid TOML, bad URLs, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local storage errors (database open, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The device reported no network connectivity.
    #[error("no internet connection")]
    NoConnectivity,

    /// A marker identifier was empty or contained forbidden characters.
    #[error("invalid marker id `{0}`")]
    InvalidMarkerId(String),

    /// A payload did not decode into a valid marker record.
    #[error("invalid marker data from {source_name}: {reason}")]
    InvalidPayload {
        source_name: String,
        reason: MarkerDecodeError,
    },

    /// Neither data source knows the requested marker.
    #[error("marker {marker_id} not found")]
    NotFound { marker_id: String },

    /// A remote source failed in a way that may succeed on a later attempt.
    #[error("{source_name} request failed: {message}")]
    Source {
        source_name: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The primary source failed and the fallback read also failed.
    #[error("both sources failed to fetch marker data ({primary}; {fallback})")]
    BothSourcesFailed { primary: String, fallback: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// All attempts of the retry policy failed.
    #[error("failed to load marker data after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<ArscanError> },

    /// REST endpoint rejected an auth, profile, or marker management call.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    /// The operation was abandoned by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ArscanError {
    /// Whether a failed fetch attempt may be retried.
    ///
    /// Deterministic failures (bad payload, unknown marker, offline device)
    /// fail fast so they do not burn the backoff budget.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ArscanError::Config(_)
                | ArscanError::NoConnectivity
                | ArscanError::InvalidMarkerId(_)
                | ArscanError::InvalidPayload { .. }
                | ArscanError::NotFound { .. }
                | ArscanError::RetriesExhausted { .. }
                | ArscanError::Cancelled
        )
    }

    /// Convenience constructor for transient remote failures.
    pub fn transient(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ArscanError::Source {
            source_name: source_name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Message suitable for an end-user alert.
    pub fn user_message(&self) -> String {
        match self {
            ArscanError::RetriesExhausted { last, .. } => {
                format!("Failed to load marker data: {last}")
            }
            other => format!("Failed to load marker data: {other}"),
        }
    }
}
