// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted [`MarkerSource`] and [`ConnectivityProbe`] doubles.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use arscan_core::{ArscanError, ConnectivityProbe, MarkerId, MarkerSource};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

/// One scripted answer of a [`MockSource`].
#[derive(Debug, Clone)]
pub enum Scripted {
    /// The source returns this payload.
    Found(Value),
    /// The source answers but does not know the marker.
    Missing,
    /// The source fails with a retryable error carrying this message.
    Fail(String),
    /// The call never completes.
    Hang,
}

/// A marker source that replays scripted answers in order.
///
/// Once the queue is drained every call gets the `otherwise` answer
/// (a transient failure unless overridden).
pub struct MockSource {
    name: String,
    script: Mutex<VecDeque<Scripted>>,
    otherwise: Scripted,
    calls: AtomicU32,
    requested: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(VecDeque::new()),
            otherwise: Scripted::Fail("mock source exhausted".into()),
            calls: AtomicU32::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// A source that answers every call with `answer`.
    pub fn always(name: &str, answer: Scripted) -> Self {
        let mut source = Self::new(name);
        source.otherwise = answer;
        source
    }

    /// A source that replays `answers` once, then fails.
    pub fn with_script(name: &str, answers: Vec<Scripted>) -> Self {
        let mut source = Self::new(name);
        source.script = Mutex::new(VecDeque::from(answers));
        source
    }

    pub async fn push(&self, answer: Scripted) {
        self.script.lock().await.push_back(answer);
    }

    /// Number of `lookup` calls so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Marker ids in the order they were requested.
    pub async fn requested(&self) -> Vec<String> {
        self.requested.lock().await.clone()
    }
}

#[async_trait]
impl MarkerSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, marker_id: &MarkerId) -> Result<Option<Value>, ArscanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().await.push(marker_id.to_string());

        let next = self.script.lock().await.pop_front();
        let answer = match next {
            Some(answer) => answer,
            None => self.otherwise.clone(),
        };
        match answer {
            Scripted::Found(value) => Ok(Some(value)),
            Scripted::Missing => Ok(None),
            Scripted::Fail(message) => Err(ArscanError::transient(self.name.as_str(), message)),
            Scripted::Hang => std::future::pending().await,
        }
    }
}

/// A connectivity probe with a settable answer and a call counter.
pub struct MockConnectivity {
    online: AtomicBool,
    checks: AtomicU32,
}

impl MockConnectivity {
    pub fn online() -> Self {
        Self {
            online: AtomicBool::new(true),
            checks: AtomicU32::new(0),
        }
    }

    pub fn offline() -> Self {
        let probe = Self::online();
        probe.set_online(false);
        probe
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of reachability checks so far.
    pub fn checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityProbe for MockConnectivity {
    async fn is_connected(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.online.load(Ordering::SeqCst)
    }
}
