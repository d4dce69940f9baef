// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of config, storage, remote clients, and the fetch pipeline.

use std::sync::Arc;

use arscan_api::{ApiClient, FirestoreClient, HttpConnectivityProbe};
use arscan_config::ArscanConfig;
use arscan_core::{AlwaysOnline, ArscanError, CacheStore, ConnectivityProbe};
use arscan_marker::{MarkerCache, MarkerFetcher, RetryPolicy};
use arscan_storage::{SessionStore, SqliteStore};
use tracing::{debug, info};

/// Everything a command needs, built once per invocation.
pub struct AppContext {
    pub config: ArscanConfig,
    pub store: Arc<SqliteStore>,
    pub session: SessionStore,
    pub api: ApiClient,
    pub fetcher: Arc<MarkerFetcher>,
}

impl AppContext {
    /// Open storage and build the clients. A stored auth token is attached
    /// to the REST client.
    pub async fn init(config: ArscanConfig) -> Result<Self, ArscanError> {
        let store = Arc::new(SqliteStore::open(&config.storage).await?);
        let session = SessionStore::new(store.clone());

        let api = ApiClient::new(&config.api)?;
        if let Some(token) = session.auth_token().await? {
            debug!("using stored auth token");
            api.set_token(Some(token));
        }

        let fetcher = Arc::new(build_fetcher(&config, store.clone(), &api)?);
        Ok(Self {
            config,
            store,
            session,
            api,
            fetcher,
        })
    }

    /// Checkpoint storage before exit.
    pub async fn close(&self) -> Result<(), ArscanError> {
        self.store.close().await
    }
}

/// Assemble the fetch routine from `config`.
///
/// The Firestore fallback is attached only when a project is configured.
pub fn build_fetcher(
    config: &ArscanConfig,
    store: Arc<dyn CacheStore>,
    api: &ApiClient,
) -> Result<MarkerFetcher, ArscanError> {
    let cache = MarkerCache::new(store, config.fetch.cache_ttl());
    let connectivity: Arc<dyn ConnectivityProbe> = if config.fetch.check_connectivity {
        Arc::new(HttpConnectivityProbe::new(&config.fetch.connectivity_url)?)
    } else {
        Arc::new(AlwaysOnline)
    };

    let mut fetcher = MarkerFetcher::new(cache, Arc::new(api.clone()), connectivity)
        .with_policy(RetryPolicy::from(&config.fetch))
        .with_call_timeout(config.api.request_timeout())
        .with_connectivity_check(config.fetch.check_connectivity);

    match FirestoreClient::from_config(&config.firestore, &config.api)? {
        Some(firestore) => {
            info!(collection = %config.firestore.collection, "firestore fallback enabled");
            fetcher = fetcher.with_fallback(Arc::new(firestore));
        }
        None => debug!("firestore fallback disabled"),
    }
    Ok(fetcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arscan_core::MarkerId;
    use arscan_test_utils::{MemoryStore, TestHarness};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(api: &MockServer, firestore: Option<&MockServer>) -> ArscanConfig {
        let mut config = ArscanConfig::default();
        config.api.base_url = api.uri();
        config.fetch.check_connectivity = false;
        config.fetch.retry_delay_ms = 10;
        config.fetch.max_retries = 1;
        if let Some(server) = firestore {
            config.firestore.project_id = Some("demo".into());
            config.firestore.base_url = server.uri();
        }
        config
    }

    #[tokio::test]
    async fn rest_miss_falls_back_to_firestore() {
        let api = MockServer::start().await;
        let firestore = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get-marker"))
            .and(query_param("markerId", "abc-123"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&api)
            .await;
        Mock::given(method("GET"))
            .and(path(
                "/v1/projects/demo/databases/(default)/documents/markers/abc-123",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fields": {
                    "imageUrl": { "stringValue": "https://x/i.png" },
                    "videoUrl": { "stringValue": "https://x/v.mp4" }
                }
            })))
            .expect(1)
            .mount(&firestore)
            .await;

        let config = config_for(&api, Some(&firestore));
        let store = Arc::new(MemoryStore::new());
        let client = ApiClient::new(&config.api).unwrap();
        let fetcher = build_fetcher(&config, store.clone(), &client).unwrap();

        let record = fetcher
            .fetch(&MarkerId::new("abc-123").unwrap())
            .await
            .unwrap();
        assert_eq!(record.video_url, "https://x/v.mp4");
        assert!(store.snapshot().await.contains_key("marker_abc-123"));
    }

    fn firestore_marker() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "fields": {
                "imageUrl": { "stringValue": "https://x/i.png" },
                "videoUrl": { "stringValue": "https://x/v.mp4" }
            }
        }))
    }

    #[tokio::test]
    async fn backend_outage_reaches_firestore_when_online() {
        let down = MockServer::start().await;
        let down_uri = down.uri();
        drop(down);

        let network = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&network)
            .await;
        let firestore = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/v1/projects/demo/databases/(default)/documents/markers/abc-123",
            ))
            .respond_with(firestore_marker())
            .expect(1)
            .mount(&firestore)
            .await;

        let mut config = config_for(&network, Some(&firestore));
        config.api.base_url = down_uri;
        config.fetch.check_connectivity = true;
        config.fetch.connectivity_url = network.uri();
        let client = ApiClient::new(&config.api).unwrap();
        let fetcher = build_fetcher(&config, Arc::new(MemoryStore::new()), &client).unwrap();

        let record = fetcher
            .fetch(&MarkerId::new("abc-123").unwrap())
            .await
            .unwrap();
        assert_eq!(record.image_url, "https://x/i.png");
    }

    #[tokio::test]
    async fn unreachable_probe_target_reports_offline() {
        let api = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&api)
            .await;
        let offline = MockServer::start().await;
        let offline_uri = offline.uri();
        drop(offline);

        let mut config = config_for(&api, None);
        config.fetch.check_connectivity = true;
        config.fetch.connectivity_url = offline_uri;
        let client = ApiClient::new(&config.api).unwrap();
        let fetcher = build_fetcher(&config, Arc::new(MemoryStore::new()), &client).unwrap();

        let err = fetcher
            .fetch(&MarkerId::new("abc-123").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ArscanError::NoConnectivity), "got {err:?}");
    }

    #[tokio::test]
    async fn init_attaches_stored_token() {
        let api = MockServer::start().await;
        let harness = TestHarness::with_config(config_for(&api, None))
            .await
            .unwrap();
        harness.session().set_auth_token("tok-7").await.unwrap();

        let ctx = AppContext::init(harness.config().clone()).await.unwrap();
        assert_eq!(ctx.api.token().as_deref(), Some("tok-7"));
        ctx.close().await.unwrap();
    }
}
