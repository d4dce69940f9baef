// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote marker data source trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ArscanError;
use crate::types::MarkerId;

/// A remote collaborator that can look up marker metadata.
///
/// Implementations return the raw payload; shape validation happens in the
/// caller through [`crate::MarkerRecord::decode`].
#[async_trait]
pub trait MarkerSource: Send + Sync + 'static {
    /// Short name used in logs and error messages (e.g. `rest`, `firestore`).
    fn name(&self) -> &str;

    /// Looks up `marker_id`.
    ///
    /// `Ok(None)` means the source answered and does not know the marker.
    async fn lookup(&self, marker_id: &MarkerId) -> Result<Option<Value>, ArscanError>;
}
