// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only Firestore document lookup, used as the fallback marker source.

use std::time::Duration;

use arscan_config::model::{ApiConfig, FirestoreConfig};
use arscan_core::{ArscanError, MarkerId, MarkerSource};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::types::FirestoreDocument;

/// Source name reported in logs and errors.
pub const FIRESTORE_SOURCE: &str = "firestore";

/// Fetches `{collection}/{markerId}` documents over the Firestore REST API.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: reqwest::Client,
    documents_url: Url,
    api_key: Option<String>,
    request_timeout: Duration,
}

impl FirestoreClient {
    /// Builds a client, or `Ok(None)` when no project is configured.
    ///
    /// Timeouts are shared with the REST client's `[api]` section.
    pub fn from_config(
        firestore: &FirestoreConfig,
        api: &ApiConfig,
    ) -> Result<Option<Self>, ArscanError> {
        let Some(project_id) = firestore.project_id.as_deref().filter(|_| firestore.is_enabled())
        else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(api.request_timeout())
            .connect_timeout(api.connect_timeout())
            .build()
            .map_err(|e| ArscanError::Config(format!("failed to build HTTP client: {e}")))?;

        let mut documents_url = Url::parse(&firestore.base_url)
            .map_err(|e| ArscanError::Config(format!("invalid firestore.base_url: {e}")))?;
        documents_url
            .path_segments_mut()
            .map_err(|()| ArscanError::Config("firestore.base_url cannot hold a path".into()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                project_id.trim(),
                "databases",
                "(default)",
                "documents",
                firestore.collection.as_str(),
            ]);

        Ok(Some(Self {
            client,
            documents_url,
            api_key: firestore.api_key.clone(),
            request_timeout: api.request_timeout(),
        }))
    }

    fn document_url(&self, marker_id: &MarkerId) -> Result<Url, ArscanError> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|()| ArscanError::Internal("firestore URL lost its path".into()))?
            .push(marker_id.as_str());
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

#[async_trait]
impl MarkerSource for FirestoreClient {
    fn name(&self) -> &str {
        FIRESTORE_SOURCE
    }

    async fn lookup(&self, marker_id: &MarkerId) -> Result<Option<Value>, ArscanError> {
        let response = self
            .client
            .get(self.document_url(marker_id)?)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    return ArscanError::Timeout {
                        duration: self.request_timeout,
                    };
                }
                ArscanError::Source {
                    source_name: FIRESTORE_SOURCE.into(),
                    message: format!("document read failed: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;

        let status = response.status();
        debug!(marker_id = %marker_id, status = %status, "firestore response received");
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArscanError::transient(
                FIRESTORE_SOURCE,
                format!("document read returned {status}: {body}"),
            ));
        }

        let document: FirestoreDocument =
            response.json().await.map_err(|e| ArscanError::Source {
                source_name: FIRESTORE_SOURCE.into(),
                message: format!("failed to parse document: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Some(document.into_plain_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, api_key: Option<&str>) -> FirestoreConfig {
        FirestoreConfig {
            project_id: Some("arscan-demo".into()),
            api_key: api_key.map(String::from),
            base_url: server.uri(),
            collection: "markers".into(),
        }
    }

    const DOC_PATH: &str = "/v1/projects/arscan-demo/databases/(default)/documents/markers/abc-123";

    #[test]
    fn disabled_without_project() {
        let client =
            FirestoreClient::from_config(&FirestoreConfig::default(), &ApiConfig::default())
                .unwrap();
        assert!(client.is_none());
    }

    #[tokio::test]
    async fn reads_document_and_flattens_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOC_PATH))
            .and(query_param("key", "web-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/arscan-demo/databases/(default)/documents/markers/abc-123",
                "fields": {
                    "imageUrl": { "stringValue": "https://x/i.png" },
                    "videoUrl": { "stringValue": "https://x/v.mp4" }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = FirestoreClient::from_config(
            &config_for(&server, Some("web-key")),
            &ApiConfig::default(),
        )
        .unwrap()
        .unwrap();
        let doc = client
            .lookup(&MarkerId::new("abc-123").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            doc,
            json!({ "imageUrl": "https://x/i.png", "videoUrl": "https://x/v.mp4" })
        );
    }

    #[tokio::test]
    async fn missing_document_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "status": "NOT_FOUND" }
            })))
            .mount(&server)
            .await;

        let client = FirestoreClient::from_config(&config_for(&server, None), &ApiConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(
            client.lookup(&MarkerId::new("abc-123").unwrap()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn permission_denied_is_transient_source_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let client = FirestoreClient::from_config(&config_for(&server, None), &ApiConfig::default())
            .unwrap()
            .unwrap();
        let err = client
            .lookup(&MarkerId::new("abc-123").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().starts_with("firestore request failed"), "got: {err}");
    }
}
