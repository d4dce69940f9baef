// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network reachability check.
//!
//! The probe target is a neutral endpoint, not a marker source, so an outage
//! of the REST backend is reported by the fetch and not as lost connectivity.

use std::time::Duration;

use arscan_core::{ArscanError, ConnectivityProbe};
use async_trait::async_trait;
use tracing::debug;

/// How long a reachability probe may take before the device counts as offline.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Reports the device online when `HEAD {url}` gets any HTTP response.
#[derive(Debug, Clone)]
pub struct HttpConnectivityProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpConnectivityProbe {
    pub fn new(url: &str) -> Result<Self, ArscanError> {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .connect_timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| ArscanError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn is_connected(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "connectivity probe answered");
                true
            }
            Err(e) => {
                debug!(error = %e, "connectivity probe failed");
                false
            }
        }
    }
}
