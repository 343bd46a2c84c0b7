//! SQLite-backed persistence port.
//!
//! Every document lives in a single `kv` table, one row per key. Writes are
//! `INSERT OR REPLACE`, so the last writer wins and a document is either
//! fully written or absent.

use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::Store;
use crate::error::StorageError;

/// SQLite database holding the JSON documents.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened store");
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }

    /// Store raw text under `key` without JSON encoding.
    pub fn put_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )
}

impl Store for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let raw = match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Malformed {
                key: key.to_string(),
                source,
            })
    }

    fn put(&self, key: &str, document: &serde_json::Value) -> Result<(), StorageError> {
        self.put_raw(key, &document.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_key_is_none() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.get("settings").unwrap().is_none());
    }

    #[test]
    fn put_then_get() {
        let store = SqliteStore::open_memory().unwrap();
        store.put("stats", &json!({"totalWorkSeconds": 60})).unwrap();
        assert_eq!(
            store.get("stats").unwrap(),
            Some(json!({"totalWorkSeconds": 60}))
        );
    }

    #[test]
    fn last_write_wins() {
        let store = SqliteStore::open_memory().unwrap();
        store.put("tasks", &json!([1])).unwrap();
        store.put("tasks", &json!([1, 2])).unwrap();
        assert_eq!(store.get("tasks").unwrap(), Some(json!([1, 2])));
        assert_eq!(store.keys().unwrap(), vec!["tasks".to_string()]);
    }

    #[test]
    fn malformed_text_is_reported() {
        let store = SqliteStore::open_memory().unwrap();
        store.put_raw("settings", "{not json").unwrap();
        assert!(matches!(
            store.get("settings"),
            Err(StorageError::Malformed { .. })
        ));
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusloop.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.put("settings", &json!({"workDuration": 600})).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("settings").unwrap(),
            Some(json!({"workDuration": 600}))
        );
    }
}
