// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scan-to-marker state machine driving one camera view.
//!
//! A scan disables further scans, invalidates the cached copy of the marker,
//! and runs the fetch routine. [`ScanSession::reset`] abandons everything:
//! the in-flight fetch (or its pending retry sleep) is cancelled and its
//! result is discarded even if it races the reset.

use std::sync::Arc;

use arscan_core::{ArscanError, MarkerId, MarkerRecord, parse_marker_id_from_scan};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::fetcher::MarkerFetcher;

/// Shown when scanned text carries no marker id.
pub const INVALID_CODE_MESSAGE: &str = "Invalid QR code format";

/// Observable state of a scan session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanState {
    /// Scans are accepted.
    pub is_scanning: bool,
    /// A fetch is running or waiting to retry.
    pub is_preparing: bool,
    /// A valid code was scanned and its marker is loading or loaded.
    pub has_scanned: bool,
    pub marker_id: Option<MarkerId>,
    pub marker: Option<MarkerRecord>,
    /// Last user-facing error.
    pub error: Option<String>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            is_scanning: true,
            is_preparing: false,
            has_scanned: false,
            marker_id: None,
            marker: None,
            error: None,
        }
    }
}

/// Result of a scan or retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Scanning was disabled; the input was dropped.
    Ignored,
    /// The text was not a marker URL or UUID. Scanning stays enabled.
    InvalidCode,
    /// The marker loaded.
    Ready(MarkerRecord),
    /// The fetch failed; the session is back to scanning.
    Failed(String),
    /// The session was reset while the fetch ran.
    Abandoned,
}

#[derive(Default)]
struct Inner {
    state: ScanState,
    // Kept across a failure so `retry` knows what to reload.
    last_marker: Option<MarkerId>,
    // Bumped by every reset; a fetch whose ticket is stale is abandoned.
    generation: u64,
    cancel: CancellationToken,
}

/// Generation and cancel token of the fetch a scan or retry started.
struct Ticket {
    generation: u64,
    cancel: CancellationToken,
}

pub struct ScanSession {
    fetcher: Arc<MarkerFetcher>,
    inner: Mutex<Inner>,
}

impl ScanSession {
    pub fn new(fetcher: Arc<MarkerFetcher>) -> Self {
        Self {
            fetcher,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub async fn state(&self) -> ScanState {
        self.inner.lock().await.state.clone()
    }

    /// Handle decoded QR text.
    pub async fn handle_scan(&self, raw: &str) -> ScanOutcome {
        let (marker_id, ticket) = {
            let mut inner = self.inner.lock().await;
            if !inner.state.is_scanning || raw.trim().is_empty() {
                return ScanOutcome::Ignored;
            }
            let Some(marker_id) = parse_marker_id_from_scan(raw) else {
                debug!(raw, "scanned text is not a marker code");
                inner.state.error = Some(INVALID_CODE_MESSAGE.to_string());
                return ScanOutcome::InvalidCode;
            };
            info!(marker_id = %marker_id, "marker code scanned");
            let ticket = Self::begin(&mut inner, &marker_id);
            (marker_id, ticket)
        };

        // A fresh scan always replaces the cached copy.
        if let Err(e) = self.fetcher.cache().remove(&marker_id).await {
            warn!(marker_id = %marker_id, error = %e, "failed to invalidate cached marker");
        }
        self.run(marker_id, ticket).await
    }

    /// Reload the last scanned marker from the top, cache check included.
    pub async fn retry(&self) -> ScanOutcome {
        let (marker_id, ticket) = {
            let mut inner = self.inner.lock().await;
            if inner.state.is_preparing {
                return ScanOutcome::Ignored;
            }
            let Some(marker_id) = inner.last_marker.clone() else {
                return ScanOutcome::Ignored;
            };
            let ticket = Self::begin(&mut inner, &marker_id);
            (marker_id, ticket)
        };
        self.run(marker_id, ticket).await
    }

    /// Abandon any in-flight fetch and return to scanning.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.cancel.cancel();
        *inner = Inner {
            generation: inner.generation + 1,
            ..Inner::default()
        };
        debug!(generation = inner.generation, "scan session reset");
    }

    /// Drop every cached marker. Returns how many were removed.
    pub async fn clear_cache(&self) -> Result<usize, ArscanError> {
        self.fetcher.cache().clear_all().await
    }

    fn begin(inner: &mut Inner, marker_id: &MarkerId) -> Ticket {
        inner.state = ScanState {
            is_scanning: false,
            is_preparing: true,
            has_scanned: true,
            marker_id: Some(marker_id.clone()),
            marker: None,
            error: None,
        };
        inner.last_marker = Some(marker_id.clone());
        Ticket {
            generation: inner.generation,
            cancel: inner.cancel.clone(),
        }
    }

    async fn run(&self, marker_id: MarkerId, ticket: Ticket) -> ScanOutcome {
        let result = self
            .fetcher
            .fetch_with_cancel(&marker_id, &ticket.cancel)
            .await;

        let mut inner = self.inner.lock().await;
        if inner.generation != ticket.generation {
            debug!(marker_id = %marker_id, "discarding result of abandoned fetch");
            return ScanOutcome::Abandoned;
        }

        match result {
            Ok(record) => {
                inner.state.is_preparing = false;
                inner.state.marker = Some(record.clone());
                ScanOutcome::Ready(record)
            }
            Err(ArscanError::Cancelled) => ScanOutcome::Abandoned,
            Err(e) => {
                let message = e.user_message();
                warn!(marker_id = %marker_id, error = %e, "failed to load marker");
                inner.state = ScanState {
                    error: Some(message.clone()),
                    ..ScanState::default()
                };
                ScanOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DEFAULT_TTL, MarkerCache};
    use crate::retry::RetryPolicy;
    use arscan_core::CacheStore;
    use arscan_test_utils::{MemoryStore, MockConnectivity, MockSource, Scripted};
    use serde_json::{Value, json};
    use std::time::Duration;

    const UUID: &str = "9f1c2d3e-4b5a-4c6d-8e7f-0a1b2c3d4e5f";

    fn payload(tag: &str) -> Value {
        json!({
            "imageUrl": format!("https://x/{tag}.png"),
            "videoUrl": format!("https://x/{tag}.mp4")
        })
    }

    fn session_with(
        source: MockSource,
        policy: RetryPolicy,
    ) -> (Arc<ScanSession>, Arc<MemoryStore>, Arc<MockSource>) {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(source);
        let fetcher = MarkerFetcher::new(
            MarkerCache::new(store.clone(), DEFAULT_TTL),
            source.clone(),
            Arc::new(MockConnectivity::online()),
        )
        .with_policy(policy);
        (
            Arc::new(ScanSession::new(Arc::new(fetcher))),
            store,
            source,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn scan_loads_marker_and_stops_scanning() {
        let (session, _, _) = session_with(
            MockSource::always("rest", Scripted::Found(payload("a"))),
            RetryPolicy::default(),
        );

        let url = format!("https://arweb-tau.vercel.app/ar/{UUID}");
        let outcome = session.handle_scan(&url).await;
        assert!(matches!(outcome, ScanOutcome::Ready(_)));

        let state = session.state().await;
        assert!(!state.is_scanning);
        assert!(!state.is_preparing);
        assert!(state.has_scanned);
        assert_eq!(state.marker_id.as_ref().map(MarkerId::as_str), Some(UUID));
        assert!(state.marker.is_some());

        // Scans are ignored until reset.
        assert_eq!(session.handle_scan(UUID).await, ScanOutcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_code_keeps_scanning() {
        let (session, _, source) = session_with(MockSource::new("rest"), RetryPolicy::default());

        assert_eq!(session.handle_scan("not a url").await, ScanOutcome::InvalidCode);
        let state = session.state().await;
        assert!(state.is_scanning);
        assert_eq!(state.error.as_deref(), Some(INVALID_CODE_MESSAGE));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn scan_replaces_cached_copy() {
        let (session, store, source) = session_with(
            MockSource::always("rest", Scripted::Found(payload("fresh"))),
            RetryPolicy::default(),
        );
        let stale = MarkerRecord::decode(&payload("stale")).unwrap();
        let id = MarkerId::new(UUID).unwrap();
        MarkerCache::new(store.clone(), DEFAULT_TTL)
            .put(&id, &stale)
            .await
            .unwrap();

        let outcome = session.handle_scan(UUID).await;
        let ScanOutcome::Ready(record) = outcome else {
            panic!("expected Ready, got {outcome:?}");
        };
        assert_eq!(record.image_url, "https://x/fresh.png");
        assert_eq!(source.calls(), 1);
        assert!(store.get(&format!("marker_{UUID}")).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_resets_to_scanning_and_retry_reloads() {
        let (session, _, source) = session_with(
            MockSource::with_script(
                "rest",
                vec![Scripted::Missing, Scripted::Found(payload("b"))],
            ),
            RetryPolicy::default(),
        );

        let outcome = session.handle_scan(UUID).await;
        let ScanOutcome::Failed(message) = outcome else {
            panic!("expected Failed, got {outcome:?}");
        };
        assert!(message.starts_with("Failed to load marker data: "));
        let state = session.state().await;
        assert!(state.is_scanning);
        assert!(!state.has_scanned);
        assert_eq!(state.error, Some(message));

        assert!(matches!(session.retry().await, ScanOutcome::Ready(_)));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_without_prior_scan_is_ignored() {
        let (session, _, _) = session_with(MockSource::new("rest"), RetryPolicy::default());
        assert_eq!(session.retry().await, ScanOutcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_abandons_pending_retry() {
        let (session, _, source) = session_with(
            MockSource::always("rest", Scripted::Fail("HTTP 503".into())),
            RetryPolicy::default(),
        );

        let scanning = {
            let session = session.clone();
            tokio::spawn(async move { session.handle_scan(UUID).await })
        };
        // First attempt fails at once; the task is now in its 2s backoff.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(session.state().await.is_preparing);

        session.reset().await;
        assert_eq!(scanning.await.unwrap(), ScanOutcome::Abandoned);
        assert_eq!(source.calls(), 1);
        assert_eq!(session.state().await, ScanState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_abandons_hung_request() {
        let (session, _, _) = session_with(
            MockSource::always("rest", Scripted::Hang),
            RetryPolicy::default(),
        );

        let scanning = {
            let session = session.clone();
            tokio::spawn(async move { session.handle_scan(UUID).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        session.reset().await;

        assert_eq!(scanning.await.unwrap(), ScanOutcome::Abandoned);
        assert!(session.state().await.is_scanning);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_during_invalidation_abandons_scan() {
        let (session, store, source) = session_with(
            MockSource::always("rest", Scripted::Found(payload("late"))),
            RetryPolicy::default(),
        );
        store.pause_removes();

        let scanning = {
            let session = session.clone();
            tokio::spawn(async move { session.handle_scan(UUID).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(session.state().await.is_preparing);

        session.reset().await;
        store.resume_removes();

        assert_eq!(scanning.await.unwrap(), ScanOutcome::Abandoned);
        assert_eq!(source.calls(), 0);
        assert_eq!(session.state().await, ScanState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cache_removes_all_markers() {
        let (session, store, _) = session_with(
            MockSource::always("rest", Scripted::Found(payload("c"))),
            RetryPolicy::default(),
        );
        session.handle_scan(UUID).await;
        store.set("user", "{}").await.unwrap();

        assert_eq!(session.clear_cache().await.unwrap(), 1);
        assert_eq!(store.keys().await.unwrap(), vec!["user"]);
    }
}
