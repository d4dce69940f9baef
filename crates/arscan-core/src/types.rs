// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the arscan workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArscanError;

/// Opaque identifier of a registered marker, usually decoded from a QR code.
///
/// The identifier is embedded in cache keys and URL paths, so it must be
/// non-empty and free of whitespace, `/`, `?`, `#` and `&`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MarkerId(String);

impl MarkerId {
    /// Validate and wrap a raw identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, ArscanError> {
        let raw = raw.into();
        let forbidden = |c: char| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '&');
        if raw.is_empty() || raw.chars().any(forbidden) {
            return Err(ArscanError::InvalidMarkerId(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MarkerId {
    type Err = ArscanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MarkerId {
    type Error = ArscanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MarkerId> for String {
    fn from(id: MarkerId) -> Self {
        id.0
    }
}

/// Validated marker metadata: the assets the AR overlay needs.
///
/// Instances are only produced by [`MarkerRecord::decode`] or by callers
/// that construct one explicitly; a fetched record is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerRecord {
    /// Reference image of the marker.
    pub image_url: String,
    /// Video played on top of the detected marker.
    pub video_url: String,
    /// Precomputed tracking pattern file, if the backend has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_url: Option<String>,
}

impl MarkerRecord {
    /// The tracking pattern to load, falling back to the reference image.
    pub fn pattern_or_image_url(&self) -> &str {
        self.pattern_url.as_deref().unwrap_or(&self.image_url)
    }
}

/// A registered user as returned by the REST backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Partial profile update sent to `PUT /api/update-profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Response body of `POST /api/Login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Response body of `POST /api/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: User,
    /// Present when the backend signs the new user in immediately.
    #[serde(default)]
    pub token: Option<String>,
}

/// Summary of the cached marker entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub keys: Vec<String>,
    pub size_bytes: usize,
}
