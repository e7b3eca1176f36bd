//! Persistent key-value storage for equiptrack.
//!
//! The session gate keeps the signed-in user under a single key. This
//! module provides the [`KeyValueStore`] seam it talks to, a `SQLite`-backed
//! [`LocalStorage`] that survives restarts, and a [`MemoryStorage`] for
//! ephemeral sessions and tests.

pub mod migrations;
pub mod schema;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// String key-value storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<bool>;
}

/// Key-value storage in a `SQLite` database file.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    conn: Connection,
}

impl LocalStorage {
    /// Open or create the storage database at the given path.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening local storage at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Local storage opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            (key, value),
        )?;
        debug!(key, "stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", [key])?;
        debug!(key, removed = affected > 0, "removed value");
        Ok(affected > 0)
    }
}

/// Key-value storage that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut impl KeyValueStore) {
        assert_eq!(store.get("user").unwrap(), None);

        store.set("user", "first").unwrap();
        assert_eq!(store.get("user").unwrap().as_deref(), Some("first"));

        store.set("user", "second").unwrap();
        assert_eq!(store.get("user").unwrap().as_deref(), Some("second"));

        assert!(store.remove("user").unwrap());
        assert!(!store.remove("user").unwrap());
        assert_eq!(store.get("user").unwrap(), None);
    }

    #[test]
    fn test_local_storage_in_memory() {
        let mut storage = LocalStorage::open_in_memory().unwrap();
        exercise(&mut storage);
        assert_eq!(storage.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        exercise(&mut storage);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_local_storage_persists_across_opens() {
        let dir = std::env::temp_dir().join(format!(
            "equiptrack-storage-test-{}",
            std::process::id()
        ));
        let path = dir.join("nested").join("local_storage.db");

        {
            let mut storage = LocalStorage::open(&path).unwrap();
            storage.set("user", r#"{"email":"a@b.c"}"#).unwrap();
        }
        {
            let storage = LocalStorage::open(&path).unwrap();
            assert_eq!(
                storage.get("user").unwrap().as_deref(),
                Some(r#"{"email":"a@b.c"}"#)
            );
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_memory_storage_len() {
        let mut storage = MemoryStorage::new();
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        assert_eq!(storage.len(), 2);
    }
}
