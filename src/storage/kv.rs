//! Key-value persistence backends.
//!
//! The repository reads and writes whole JSON collections under fixed
//! keys; this trait keeps it ignorant of where those strings live. The
//! SQLite store is the durable default, the in-memory store backs tests
//! and throwaway sessions.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::StoreError;

use super::schema::create_tables;

/// String-keyed blob storage for serialized collections.
pub trait KeyValueStore: Send {
    /// Fetch the value stored at `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value at `key`. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Durable store backed by a single-table SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `path`, creating the file and any missing
    /// parent directories on first use.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        create_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Open a private in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// Volatile store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned lock still holds a consistent string map.
        self.map.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_contract(store: &dyn KeyValueStore) {
        assert_eq!(store.get("races").unwrap(), None);

        store.set("races", "[]").unwrap();
        assert_eq!(store.get("races").unwrap().as_deref(), Some("[]"));

        store.set("races", r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(
            store.get("races").unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );

        store.remove("races").unwrap();
        assert_eq!(store.get("races").unwrap(), None);

        // Removing a key that was never set is fine
        store.remove("horses").unwrap();
    }

    #[test]
    fn test_memory_store_contract() {
        check_contract(&MemoryStore::new());
    }

    #[test]
    fn test_sqlite_store_contract() {
        check_contract(&SqliteStore::in_memory().unwrap());
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("races", "[1,2,3]").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("races").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_sqlite_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("kv.db");

        let store = SqliteStore::open(&path).unwrap();
        store.set("k", "v").unwrap();
        assert!(path.exists());
    }
}
