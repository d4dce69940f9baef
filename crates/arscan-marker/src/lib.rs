// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marker data retrieval for arscan.
//!
//! [`MarkerCache`] stores validated records with a TTL, [`MarkerFetcher`]
//! runs the cache, primary, fallback, retry routine, and [`ScanSession`]
//! ties it to scanned QR text with abandon-on-reset semantics.

pub mod cache;
pub mod fetcher;
pub mod retry;
pub mod session;

pub use cache::{MarkerCache, cache_key};
pub use fetcher::MarkerFetcher;
pub use retry::RetryPolicy;
pub use session::{ScanOutcome, ScanSession, ScanState};
