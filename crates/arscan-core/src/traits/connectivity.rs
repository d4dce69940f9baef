// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network reachability trait.

use async_trait::async_trait;

/// Reports whether the network is currently reachable.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync + 'static {
    async fn is_connected(&self) -> bool;
}

/// Probe that always reports the network as reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

#[async_trait]
impl ConnectivityProbe for AlwaysOnline {
    async fn is_connected(&self) -> bool {
        true
    }
}
