//! SQLite-backed key-value medium.
//!
//! One `kv` table holds every value as a JSON string. An optional byte quota
//! emulates the capacity limit of a browser's local storage so the retention
//! policy has something to react to.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::backend::StorageBackend;
use crate::error::StorageError;

pub struct SqliteBackend {
    conn: Connection,
    quota_bytes: Option<u64>,
}

impl SqliteBackend {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path, quota_bytes: Option<u64>) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Backend(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        let backend = Self { conn, quota_bytes };
        backend.migrate()?;
        Ok(backend)
    }

    /// Open an in-memory database.
    pub fn open_memory(quota_bytes: Option<u64>) -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let backend = Self { conn, quota_bytes };
        backend.migrate()?;
        Ok(backend)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    fn used_bytes_excluding(&self, key: &str) -> Result<u64, rusqlite::Error> {
        let used: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv WHERE key != ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(used.max(0) as u64)
    }
}

impl StorageBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes {
            let projected = self.used_bytes_excluding(key)? + (key.len() + value.len()) as u64;
            if projected > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| match StorageError::from(e) {
                StorageError::QuotaExceeded { .. } => StorageError::QuotaExceeded {
                    key: key.to_string(),
                },
                other => other,
            })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}
