// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Namespaced key-value operations.

use arscan_core::ArscanError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Get the value stored under `key`.
pub async fn get(db: &Database, namespace: &str, key: &str) -> Result<Option<String>, ArscanError> {
    let namespace = namespace.to_string();
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT value FROM kv_store WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or overwrite `key`.
pub async fn set(db: &Database, namespace: &str, key: &str, value: &str) -> Result<(), ArscanError> {
    let namespace = namespace.to_string();
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO kv_store (namespace, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(namespace, key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![namespace, key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete `key`. Returns whether a row was removed.
pub async fn remove(db: &Database, namespace: &str, key: &str) -> Result<bool, ArscanError> {
    let namespace = namespace.to_string();
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let n = conn.execute(
                "DELETE FROM kv_store WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete several keys in one transaction. Returns the number removed.
pub async fn remove_many(
    db: &Database,
    namespace: &str,
    keys: &[String],
) -> Result<usize, ArscanError> {
    let namespace = namespace.to_string();
    let keys = keys.to_vec();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            let mut removed = 0;
            {
                let mut stmt =
                    tx.prepare("DELETE FROM kv_store WHERE namespace = ?1 AND key = ?2")?;
                for key in &keys {
                    removed += stmt.execute(params![namespace, key])?;
                }
            }
            tx.commit()?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}

/// List all keys in the namespace, sorted.
pub async fn keys(db: &Database, namespace: &str) -> Result<Vec<String>, ArscanError> {
    let namespace = namespace.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt =
                conn.prepare("SELECT key FROM kv_store WHERE namespace = ?1 ORDER BY key")?;
            let keys = stmt
                .query_map(params![namespace], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(keys)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_db(dir: &tempfile::TempDir) -> Database {
        let path = dir.path().join("kv.db");
        Database::open(path.to_str().unwrap(), true).await.unwrap()
    }

    #[tokio::test]
    async fn set_get_overwrite_remove() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        assert_eq!(get(&db, "ns", "k").await.unwrap(), None);
        set(&db, "ns", "k", "v1").await.unwrap();
        assert_eq!(get(&db, "ns", "k").await.unwrap().as_deref(), Some("v1"));
        set(&db, "ns", "k", "v2").await.unwrap();
        assert_eq!(get(&db, "ns", "k").await.unwrap().as_deref(), Some("v2"));

        assert!(remove(&db, "ns", "k").await.unwrap());
        assert!(!remove(&db, "ns", "k").await.unwrap());
        assert_eq!(get(&db, "ns", "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        set(&db, "a", "shared", "from-a").await.unwrap();
        set(&db, "b", "shared", "from-b").await.unwrap();
        assert_eq!(get(&db, "a", "shared").await.unwrap().as_deref(), Some("from-a"));
        assert_eq!(keys(&db, "b").await.unwrap(), vec!["shared".to_string()]);

        remove(&db, "a", "shared").await.unwrap();
        assert_eq!(get(&db, "b", "shared").await.unwrap().as_deref(), Some("from-b"));
    }

    #[tokio::test]
    async fn remove_many_counts_existing_rows() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        for key in ["marker_1", "marker_2", "user"] {
            set(&db, "ns", key, "{}").await.unwrap();
        }
        let removed = remove_many(
            &db,
            "ns",
            &["marker_1".into(), "marker_2".into(), "marker_404".into()],
        )
        .await
        .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(keys(&db, "ns").await.unwrap(), vec!["user".to_string()]);
    }
}
