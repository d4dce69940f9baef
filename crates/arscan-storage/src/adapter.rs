// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`CacheStore`] trait.

use arscan_config::model::StorageConfig;
use arscan_core::{ArscanError, CacheStore};
use async_trait::async_trait;
use tracing::debug;

use crate::database::Database;
use crate::queries::kv;

/// SQLite-backed key-value store scoped to one namespace.
///
/// Several stores may share a [`Database`]; each sees only its own keys.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
    namespace: String,
}

impl SqliteStore {
    /// Open the database described by `config` and scope to its namespace.
    pub async fn open(config: &StorageConfig) -> Result<Self, ArscanError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(
            path = %config.database_path,
            namespace = %config.namespace,
            "SQLite store initialized"
        );
        Ok(Self::with_database(db, &config.namespace))
    }

    /// Wrap an already-open database.
    pub fn with_database(db: Database, namespace: &str) -> Self {
        Self {
            db,
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Checkpoint the WAL before the process exits.
    pub async fn close(&self) -> Result<(), ArscanError> {
        self.db.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl CacheStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ArscanError> {
        kv::get(&self.db, &self.namespace, key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ArscanError> {
        kv::set(&self.db, &self.namespace, key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), ArscanError> {
        kv::remove(&self.db, &self.namespace, key).await.map(|_| ())
    }

    async fn keys(&self) -> Result<Vec<String>, ArscanError> {
        kv::keys(&self.db, &self.namespace).await
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), ArscanError> {
        kv::remove_many(&self.db, &self.namespace, keys)
            .await
            .map(|_| ())
    }
}
