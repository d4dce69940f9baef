// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent key-value storage trait.

use async_trait::async_trait;

use crate::error::ArscanError;

/// String key-value store backing the marker cache and session state.
///
/// Writes are unconditional overwrites (last writer wins). No locking is
/// performed: callers issue at most one fetch per marker at a time.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Returns the stored value for `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, ArscanError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), ArscanError>;

    /// Deletes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), ArscanError>;

    /// Lists every key in the store.
    async fn keys(&self) -> Result<Vec<String>, ArscanError>;

    /// Deletes several keys at once.
    async fn remove_many(&self, keys: &[String]) -> Result<(), ArscanError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
