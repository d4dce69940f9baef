// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`CacheStore`] for fast, deterministic tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use arscan_core::{ArscanError, CacheStore};
use async_trait::async_trait;
use tokio::sync::{Mutex, watch};

/// A `BTreeMap`-backed store whose reads and writes can be made to fail,
/// and whose removes can be held back.
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    removes_paused: watch::Sender<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (removes_paused, _) = watch::channel(false);
        Self {
            entries: Mutex::new(BTreeMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            removes_paused,
        }
    }

    /// Make every subsequent `get`/`keys` fail with a storage error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set`/`remove` fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Park every `remove` until [`resume_removes`](Self::resume_removes).
    pub fn pause_removes(&self) {
        self.removes_paused.send_replace(true);
    }

    pub fn resume_removes(&self) {
        self.removes_paused.send_replace(false);
    }

    /// Snapshot of the stored entries, bypassing failure injection.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().await.clone()
    }

    fn injected(flag: &AtomicBool, op: &str) -> Result<(), ArscanError> {
        if flag.load(Ordering::SeqCst) {
            return Err(ArscanError::Storage {
                source: format!("injected {op} failure").into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ArscanError> {
        Self::injected(&self.fail_reads, "read")?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ArscanError> {
        Self::injected(&self.fail_writes, "write")?;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ArscanError> {
        let mut paused = self.removes_paused.subscribe();
        // The sender lives as long as `self`, so this only ends on resume.
        let _ = paused.wait_for(|paused| !*paused).await;
        Self::injected(&self.fail_writes, "write")?;
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, ArscanError> {
        Self::injected(&self.fail_reads, "read")?;
        Ok(self.entries.lock().await.keys().cloned().collect())
    }
}
