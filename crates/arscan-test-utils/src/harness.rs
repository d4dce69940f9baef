// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness backed by a throwaway SQLite database.
//!
//! `TestHarness` owns a temp directory, a migrated [`SqliteStore`] and the
//! [`ArscanConfig`] describing it, so integration tests exercise the real
//! persistence layer without touching the user's data dir.

use std::sync::Arc;

use arscan_config::ArscanConfig;
use arscan_config::model::StorageConfig;
use arscan_core::ArscanError;
use arscan_storage::{SessionStore, SqliteStore};

pub struct TestHarness {
    config: ArscanConfig,
    store: Arc<SqliteStore>,
    // Dropped last so the database file outlives the store.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a harness with default configuration and a fresh database.
    pub async fn new() -> Result<Self, ArscanError> {
        Self::with_config(ArscanConfig::default()).await
    }

    /// Create a harness from `config`, redirecting storage into a temp dir.
    pub async fn with_config(mut config: ArscanConfig) -> Result<Self, ArscanError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ArscanError::Storage { source: e.into() })?;
        config.storage = StorageConfig {
            database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
            ..config.storage
        };
        let store = Arc::new(SqliteStore::open(&config.storage).await?);

        Ok(Self {
            config,
            store,
            _temp_dir: temp_dir,
        })
    }

    pub fn config(&self) -> &ArscanConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<SqliteStore> {
        self.store.clone()
    }

    pub fn session(&self) -> SessionStore {
        SessionStore::new(self.store.clone())
    }
}
