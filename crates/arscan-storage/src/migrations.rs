// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied
//! on every [`crate::Database::open`].

use arscan_core::ArscanError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), ArscanError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| ArscanError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}
