// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache-then-network-with-fallback marker retrieval, wrapped in a bounded
//! retry loop.
//!
//! One attempt:
//! 1. connectivity check (offline fails fast),
//! 2. cache lookup (a valid fresh entry returns without any remote call),
//! 3. primary source, persisted to the cache on success,
//! 4. on any primary failure, the fallback source; absent there means
//!    not found, a failed read means both sources failed.
//!
//! Failures that [`ArscanError::is_retryable`] rejects are returned at
//! once; the rest are retried per [`RetryPolicy`].

use std::sync::Arc;
use std::time::Duration;

use arscan_core::{ArscanError, ConnectivityProbe, MarkerId, MarkerRecord, MarkerSource};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::MarkerCache;
use crate::retry::RetryPolicy;

/// Default upper bound for a single source call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

pub struct MarkerFetcher {
    cache: MarkerCache,
    primary: Arc<dyn MarkerSource>,
    fallback: Option<Arc<dyn MarkerSource>>,
    connectivity: Arc<dyn ConnectivityProbe>,
    policy: RetryPolicy,
    call_timeout: Duration,
    check_connectivity: bool,
}

impl MarkerFetcher {
    pub fn new(
        cache: MarkerCache,
        primary: Arc<dyn MarkerSource>,
        connectivity: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            cache,
            primary,
            fallback: None,
            connectivity,
            policy: RetryPolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            check_connectivity: true,
        }
    }

    /// Source consulted whenever the primary fails.
    pub fn with_fallback(mut self, fallback: Arc<dyn MarkerSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upper bound for each source call; exceeding it is a retryable timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Skip the reachability check when `false`.
    pub fn with_connectivity_check(mut self, enabled: bool) -> Self {
        self.check_connectivity = enabled;
        self
    }

    pub fn cache(&self) -> &MarkerCache {
        &self.cache
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch `marker_id`, retrying transient failures.
    pub async fn fetch(&self, marker_id: &MarkerId) -> Result<MarkerRecord, ArscanError> {
        self.fetch_with_cancel(marker_id, &CancellationToken::new())
            .await
    }

    /// Like [`fetch`](Self::fetch), but gives up with
    /// [`ArscanError::Cancelled`] as soon as `cancel` fires, including
    /// during a backoff sleep.
    pub async fn fetch_with_cancel(
        &self,
        marker_id: &MarkerId,
        cancel: &CancellationToken,
    ) -> Result<MarkerRecord, ArscanError> {
        let mut delay = self.policy.initial_delay.min(self.policy.max_delay);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(marker_id = %marker_id, attempt, "fetching marker data");

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ArscanError::Cancelled),
                result = self.attempt(marker_id) => result,
            };

            let err = match result {
                Ok(record) => {
                    info!(marker_id = %marker_id, attempt, "marker data loaded");
                    return Ok(record);
                }
                Err(e) => e,
            };

            if !err.is_retryable() {
                warn!(marker_id = %marker_id, attempt, error = %err, "fetch failed, not retrying");
                return Err(err);
            }
            if attempt >= self.policy.max_attempts() {
                warn!(marker_id = %marker_id, attempt, error = %err, "fetch retries exhausted");
                return Err(ArscanError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            warn!(
                marker_id = %marker_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "fetch attempt failed, retrying",
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ArscanError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            delay = self.policy.next_delay(delay);
        }
    }

    async fn attempt(&self, marker_id: &MarkerId) -> Result<MarkerRecord, ArscanError> {
        if self.check_connectivity && !self.connectivity.is_connected().await {
            return Err(ArscanError::NoConnectivity);
        }

        if let Some(record) = self.cache.get(marker_id).await {
            info!(marker_id = %marker_id, "using cached marker data");
            return Ok(record);
        }

        let primary_failure = match self.load_from(self.primary.as_ref(), marker_id).await {
            Ok(record) => return Ok(record),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_failure);
        };
        warn!(
            marker_id = %marker_id,
            source = self.primary.name(),
            error = %primary_failure,
            "primary source failed, trying {}",
            fallback.name(),
        );

        match self.load_from(fallback.as_ref(), marker_id).await {
            Ok(record) => Ok(record),
            Err(e @ (ArscanError::NotFound { .. } | ArscanError::InvalidPayload { .. })) => Err(e),
            Err(e) => Err(ArscanError::BothSourcesFailed {
                primary: primary_failure.to_string(),
                fallback: e.to_string(),
            }),
        }
    }

    /// Read `marker_id` from `source`, validate it, and cache it.
    async fn load_from(
        &self,
        source: &dyn MarkerSource,
        marker_id: &MarkerId,
    ) -> Result<MarkerRecord, ArscanError> {
        let payload = tokio::time::timeout(self.call_timeout, source.lookup(marker_id))
            .await
            .map_err(|_| ArscanError::Timeout {
                duration: self.call_timeout,
            })??;

        let Some(payload) = payload else {
            return Err(ArscanError::NotFound {
                marker_id: marker_id.to_string(),
            });
        };

        let record =
            MarkerRecord::decode(&payload).map_err(|reason| ArscanError::InvalidPayload {
                source_name: source.name().to_string(),
                reason,
            })?;

        if let Err(e) = self.cache.put(marker_id, &record).await {
            warn!(marker_id = %marker_id, error = %e, "failed to cache marker data");
        }
        debug!(marker_id = %marker_id, source = source.name(), "marker data fetched");
        Ok(record)
    }
}
