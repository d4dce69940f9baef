// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for arscan integration tests.
//!
//! Provides fakes for the pipeline's seams and a harness with a temp
//! SQLite database, so tests run without network or user data.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory cache store with failure injection
//! - [`MockSource`] - Marker source replaying scripted answers
//! - [`MockConnectivity`] - Connectivity probe with a settable answer
//! - [`TestHarness`] - Temp SQLite store plus matching config

pub mod harness;
pub mod memory_store;
pub mod mock_source;

pub use harness::TestHarness;
pub use memory_store::MemoryStore;
pub use mock_source::{MockConnectivity, MockSource, Scripted};
