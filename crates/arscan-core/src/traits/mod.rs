// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the fetch pipeline and its collaborators.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod cache;
pub mod connectivity;
pub mod source;

pub use cache::CacheStore;
pub use connectivity::ConnectivityProbe;
pub use source::MarkerSource;
