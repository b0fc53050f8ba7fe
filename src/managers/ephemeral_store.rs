//! Local ephemeral key-value store.
//!
//! A small async KV interface with JSON values. There is no per-key TTL:
//! callers store a timestamp next to the value and compare it against "now"
//! at read time. Writes are last-writer-wins; a read-modify-write done by a
//! repository can lose an update to a concurrent writer.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::params;
use serde_json::Value;

use crate::database::Database;
use crate::types::errors::StoreError;

/// Storage backend shared by the auth cache, dedup ledger and preference store.
///
/// Every operation works on an empty store; no initialization call exists.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Values for the requested keys. Missing keys are absent from the map.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError>;

    /// Writes all entries, replacing existing values.
    async fn set(&self, entries: HashMap<String, Value>) -> Result<(), StoreError>;

    /// Deletes the given keys. Unknown keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;
}

/// In-process backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(keys
            .iter()
            .filter_map(|k| entries.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, new_entries: HashMap<String, Value>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        entries.extend(new_entries);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

/// SQLite-backed store over the `kv_entries` table.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

#[async_trait]
impl StorageBackend for SqliteStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        let db = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        let conn = db.connection();
        let mut stmt = conn.prepare_cached("SELECT value FROM kv_entries WHERE key = ?1")?;

        let mut out = HashMap::new();
        for key in keys {
            let mut rows = stmt.query(params![key])?;
            if let Some(row) = rows.next()? {
                let raw: String = row.get(0)?;
                out.insert(key.to_string(), serde_json::from_str(&raw)?);
            }
        }
        Ok(out)
    }

    async fn set(&self, entries: HashMap<String, Value>) -> Result<(), StoreError> {
        let mut db = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        let now = Self::now();
        let tx = db.connection_mut().transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, serde_json::to_string(&value)?, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let db = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        for key in keys {
            db.connection()
                .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        }
        Ok(())
    }
}
