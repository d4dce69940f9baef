// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for arscan.
//!
//! A single WAL-mode SQLite connection driven through `tokio-rusqlite`,
//! embedded migrations, and a namespaced key-value table that backs both
//! the marker cache and the signed-in session.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;
pub mod session;

pub use adapter::SqliteStore;
pub use database::Database;
pub use session::SessionStore;
