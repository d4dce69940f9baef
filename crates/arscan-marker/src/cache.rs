// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marker cache adapter over any [`CacheStore`].
//!
//! Entries live under `marker_{markerId}` as the record's JSON plus a
//! `cachedAt` timestamp in epoch milliseconds. Reads never fail: a missing,
//! unparseable, invalid, or expired entry reads as absent, and the last three
//! are purged on the spot.
//!
//! There is no locking; concurrent writers for the same marker are last
//! writer wins. Callers run at most one fetch per marker at a time.

use std::sync::Arc;
use std::time::Duration;

use arscan_core::{ArscanError, CacheInfo, CacheStore, MarkerId, MarkerRecord};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Key prefix of cached marker entries.
pub const MARKER_KEY_PREFIX: &str = "marker_";

/// Field holding the write time, stripped from records handed to callers.
pub const CACHED_AT_FIELD: &str = "cachedAt";

/// Default time-to-live of a cached record.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Storage key of `marker_id`.
pub fn cache_key(marker_id: &MarkerId) -> String {
    format!("{MARKER_KEY_PREFIX}{marker_id}")
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Clone)]
pub struct MarkerCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl MarkerCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached record for `marker_id`, if present, valid and fresh.
    pub async fn get(&self, marker_id: &MarkerId) -> Option<MarkerRecord> {
        let key = cache_key(marker_id);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(marker_id = %marker_id, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(marker_id = %marker_id, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        let entry: Value = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(marker_id = %marker_id, error = %e, "cached entry is unparseable, purging");
                self.purge(&key).await;
                return None;
            }
        };

        if self.is_expired(&entry) {
            info!(marker_id = %marker_id, "cached entry expired, purging");
            self.purge(&key).await;
            return None;
        }

        match MarkerRecord::decode(&entry) {
            Ok(record) => {
                debug!(marker_id = %marker_id, "cache hit");
                Some(record)
            }
            Err(reason) => {
                warn!(marker_id = %marker_id, %reason, "cached entry is invalid, purging");
                self.purge(&key).await;
                None
            }
        }
    }

    /// Store `record` stamped with the current time, replacing any entry.
    pub async fn put(&self, marker_id: &MarkerId, record: &MarkerRecord) -> Result<(), ArscanError> {
        let mut entry = serde_json::to_value(record).map_err(|e| ArscanError::Storage {
            source: Box::new(e),
        })?;
        if let Value::Object(map) = &mut entry {
            map.insert(CACHED_AT_FIELD.to_string(), Value::from(now_millis()));
        }
        self.store
            .set(&cache_key(marker_id), &entry.to_string())
            .await?;
        debug!(marker_id = %marker_id, "marker cached");
        Ok(())
    }

    /// Delete the entry for `marker_id`. Absent entries are fine.
    pub async fn remove(&self, marker_id: &MarkerId) -> Result<(), ArscanError> {
        self.store.remove(&cache_key(marker_id)).await
    }

    /// True when the entry's `cachedAt` is missing or older than the TTL.
    pub fn is_expired(&self, entry: &Value) -> bool {
        self.is_expired_at(entry, now_millis())
    }

    fn is_expired_at(&self, entry: &Value, now_ms: i64) -> bool {
        let Some(cached_at) = entry.get(CACHED_AT_FIELD).and_then(Value::as_i64) else {
            return true;
        };
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(cached_at) > ttl_ms
    }

    /// Remove every cached marker. Returns how many entries were removed.
    pub async fn clear_all(&self) -> Result<usize, ArscanError> {
        let keys = self.marker_keys().await?;
        self.store.remove_many(&keys).await?;
        info!(removed = keys.len(), "marker cache cleared");
        Ok(keys.len())
    }

    /// Cached marker keys and the total size of their stored values.
    pub async fn info(&self) -> Result<CacheInfo, ArscanError> {
        let keys = self.marker_keys().await?;
        let mut size_bytes = 0;
        for key in &keys {
            if let Some(value) = self.store.get(key).await? {
                size_bytes += value.len();
            }
        }
        Ok(CacheInfo { keys, size_bytes })
    }

    async fn marker_keys(&self) -> Result<Vec<String>, ArscanError> {
        Ok(self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(MARKER_KEY_PREFIX))
            .collect())
    }

    async fn purge(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            warn!(key, error = %e, "failed to purge cache entry");
        }
    }
}
