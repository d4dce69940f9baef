// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the arscan REST backend.
//!
//! Provides [`ApiClient`] which handles endpoint URLs, bearer
//! authentication, and mapping of `{ "error": "..." }` bodies onto
//! [`ArscanError::Api`]. It is also the primary [`MarkerSource`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use arscan_config::model::ApiConfig;
use arscan_core::{
    ArscanError, LoginResponse, MarkerId, MarkerRecord, MarkerSource, ProfileUpdate,
    SignupResponse, User,
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::types::{
    ApiErrorBody, CurrentUserResponse, LoginRequest, SignupRequest, UploadMarkerRequest,
};

/// Source name reported in logs and errors.
pub const REST_SOURCE: &str = "rest";

/// Client for the `/api/*` endpoints.
///
/// Cloning is cheap and clones share the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    token: Arc<ArcSwapOption<String>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.load().is_some())
            .finish()
    }
}

impl ApiClient {
    /// Creates a client from the `[api]` section.
    pub fn new(config: &ApiConfig) -> Result<Self, ArscanError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ArscanError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
            token: Arc::new(ArcSwapOption::empty()),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sets or clears the bearer token sent with every request.
    pub fn set_token(&self, token: Option<String>) {
        self.token.store(token.map(Arc::new));
    }

    pub fn token(&self) -> Option<String> {
        self.token.load_full().map(|t| t.as_str().to_string())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ArscanError> {
        Url::parse(&format!("{}/api/{path}", self.base_url))
            .map_err(|e| ArscanError::Config(format!("invalid API URL: {e}")))
    }

    fn marker_url(&self, marker_id: &MarkerId) -> Result<Url, ArscanError> {
        let mut url = self.endpoint("get-marker")?;
        url.query_pairs_mut()
            .append_pair("markerId", marker_id.as_str());
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.load_full() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ArscanError {
        if e.is_timeout() {
            ArscanError::Timeout {
                duration: self.request_timeout,
            }
        } else {
            ArscanError::Api {
                status: None,
                message: format!("network request failed: {e}"),
            }
        }
    }

    /// Sends `request`, failing with the body's `error` (or `fallback`) on non-2xx.
    async fn send(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<reqwest::Response, ArscanError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(status = %status, url = %response.url().path(), "api response received");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| fallback.to_string());
        Err(ArscanError::Api {
            status: Some(status.as_u16()),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ArscanError> {
        let response = self.send(request, fallback).await?;
        let status = response.status();
        response.json::<T>().await.map_err(|e| ArscanError::Api {
            status: Some(status.as_u16()),
            message: format!("failed to parse API response: {e}"),
        })
    }

    /// `POST /api/Login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ArscanError> {
        let request = self
            .client
            .post(self.endpoint("Login")?)
            .json(&LoginRequest { email, password });
        self.send_json(request, "Login failed").await
    }

    /// `POST /api/signup`.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<SignupResponse, ArscanError> {
        let request = self.client.post(self.endpoint("signup")?).json(&SignupRequest {
            email,
            password,
            first_name,
            last_name,
        });
        self.send_json(request, "Signup failed").await
    }

    /// `GET /api/current-user`. Requires a token.
    pub async fn current_user(&self) -> Result<User, ArscanError> {
        let request = self.client.get(self.endpoint("current-user")?);
        let body: CurrentUserResponse = self.send_json(request, "Failed to get user").await?;
        Ok(body.user)
    }

    /// `PUT /api/update-profile`.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ArscanError> {
        let request = self.client.put(self.endpoint("update-profile")?).json(update);
        let body: CurrentUserResponse = self.send_json(request, "Profile update failed").await?;
        Ok(body.user)
    }

    /// `POST /api/upload-marker`. Returns the backend's response body.
    pub async fn upload_marker(
        &self,
        marker_id: &MarkerId,
        record: &MarkerRecord,
    ) -> Result<Value, ArscanError> {
        let request = self
            .client
            .post(self.endpoint("upload-marker")?)
            .json(&UploadMarkerRequest {
                marker_id: marker_id.as_str(),
                record,
            });
        self.send_json(request, "Marker upload failed").await
    }

    /// `DELETE /api/delete-marker/{id}`.
    pub async fn delete_marker(&self, marker_id: &MarkerId) -> Result<(), ArscanError> {
        let mut url = self.endpoint("delete-marker")?;
        url.path_segments_mut()
            .map_err(|()| ArscanError::Config("API base URL cannot hold a path".into()))?
            .push(marker_id.as_str());
        self.send(self.client.delete(url), "Marker delete failed")
            .await
            .map(|_| ())
    }

    /// `GET /api/get-marker?markerId=`. The payload is returned unvalidated.
    pub async fn get_marker(&self, marker_id: &MarkerId) -> Result<Value, ArscanError> {
        self.lookup(marker_id)
            .await?
            .ok_or_else(|| ArscanError::NotFound {
                marker_id: marker_id.to_string(),
            })
    }
}

#[async_trait]
impl MarkerSource for ApiClient {
    fn name(&self) -> &str {
        REST_SOURCE
    }

    async fn lookup(&self, marker_id: &MarkerId) -> Result<Option<Value>, ArscanError> {
        let response = self
            .authorize(self.client.get(self.marker_url(marker_id)?))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    return ArscanError::Timeout {
                        duration: self.request_timeout,
                    };
                }
                ArscanError::Source {
                    source_name: REST_SOURCE.into(),
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;

        let status = response.status();
        debug!(marker_id = %marker_id, status = %status, "marker response received");
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ArscanError::transient(
                REST_SOURCE,
                format!("API request failed with status: {status}"),
            ));
        }

        response
            .json::<Value>()
            .await
            .map(Some)
            .map_err(|e| ArscanError::Source {
                source_name: REST_SOURCE.into(),
                message: format!("failed to parse response body: {e}"),
                source: Some(Box::new(e)),
            })
    }
}
