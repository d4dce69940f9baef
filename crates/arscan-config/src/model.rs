// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level arscan configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArscanConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// REST backend settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Document-database fallback settings.
    #[serde(default)]
    pub firestore: FirestoreConfig,

    /// Local persistent storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Marker fetch, retry, and cache settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// REST backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the backend; endpoints live under `/api/`.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Upper bound for a single HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound for establishing a connection, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://arweb-tau.vercel.app".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Firestore fallback configuration.
///
/// The fallback is disabled while `project_id` is unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FirestoreConfig {
    /// Google Cloud project hosting the database.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Web API key appended as `?key=`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Firestore REST endpoint.
    #[serde(default = "default_firestore_base_url")]
    pub base_url: String,

    /// Collection holding one document per marker id.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl FirestoreConfig {
    pub fn is_enabled(&self) -> bool {
        self.project_id.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            api_key: None,
            base_url: default_firestore_base_url(),
            collection: default_collection(),
        }
    }
}

fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_collection() -> String {
    "markers".to_string()
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Key space isolating this process's entries inside the database.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            namespace: default_namespace(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("arscan").join("arscan.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("arscan.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_namespace() -> String {
    "arscan".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Marker fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Growth factor applied to the delay after each retry. `1.0` is a fixed delay.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Ceiling for the grown delay, in milliseconds.
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,

    /// Age after which a cached marker is discarded, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Probe reachability before each attempt.
    #[serde(default = "default_check_connectivity")]
    pub check_connectivity: bool,

    /// Target of the reachability probe. Kept apart from `api.base_url` so a
    /// backend outage still reaches the fallback source.
    #[serde(default = "default_connectivity_url")]
    pub connectivity_url: String,
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            check_connectivity: default_check_connectivity(),
            connectivity_url: default_connectivity_url(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

fn default_max_retry_delay_ms() -> u64 {
    30_000
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_check_connectivity() -> bool {
    true
}

fn default_connectivity_url() -> String {
    "https://clients3.google.com/generate_204".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_contract() {
        let config = ArscanConfig::default();
        assert_eq!(config.api.base_url, "https://arweb-tau.vercel.app");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.fetch.retry_delay(), Duration::from_millis(2000));
        assert_eq!(config.fetch.cache_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.firestore.collection, "markers");
        assert!(!config.firestore.is_enabled());
        assert_ne!(config.fetch.connectivity_url, config.api.base_url);
    }

    #[test]
    fn firestore_blank_project_is_disabled() {
        let firestore = FirestoreConfig {
            project_id: Some("  ".into()),
            ..FirestoreConfig::default()
        };
        assert!(!firestore.is_enabled());
    }
}
