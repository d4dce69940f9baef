// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote collaborators for arscan.
//!
//! [`ApiClient`] talks to the REST backend (auth, profile, marker CRUD and
//! the primary marker lookup), [`FirestoreClient`] is the read-only
//! fallback, and [`HttpConnectivityProbe`] answers "is the device online".

pub mod client;
pub mod connectivity;
pub mod firestore;
mod types;

pub use client::{ApiClient, REST_SOURCE};
pub use connectivity::HttpConnectivityProbe;
pub use firestore::{FIRESTORE_SOURCE, FirestoreClient};
