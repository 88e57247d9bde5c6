//! SQLite-backed key-value store.
//!
//! Every key is one row of the `kv` table with its value stored as JSON text.
//! Multi-key writes run in a single transaction.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use qbreview_core::error::{QbError, QbResult};
use qbreview_core::kv::ChangeBus;
use qbreview_core::traits::{KeyValueStore, StoreListener};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::debug;

const UPSERT_SQL: &str =
    "INSERT INTO kv (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// SQLite key-value store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    changes: ChangeBus,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn new(path: impl AsRef<Path>) -> QbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| {
            QbError::connection_failed(format!("cannot open {}", path.display()), e)
        })?;
        let store = Self::from_connection(conn)?;
        debug!(path = %path.display(), keys = store.len()?, "Opened SQLite store");
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> QbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> QbResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            changes: ChangeBus::new(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> QbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> QbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| QbError::storage(format!("SQLite connection lock poisoned: {}", e)))
    }

    /// Number of stored keys.
    pub fn len(&self) -> QbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn has_key(&self, key: &str) -> QbResult<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row("SELECT 1 FROM kv WHERE key = ?1", params![key], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    async fn get(&self, key: &str) -> QbResult<Value> {
        let raw: Option<String> = {
            let conn = self.lock()?;
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?
        };
        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Err(QbError::key_not_found(key)),
        }
    }

    async fn set(&self, key: &str, value: Value) -> QbResult<()> {
        let encoded = serde_json::to_string(&value)?;
        {
            let conn = self.lock()?;
            conn.execute(UPSERT_SQL, params![key, encoded])?;
        }
        self.changes.emit(key, value);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> QbResult<()> {
        let mut encoded = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            encoded.push((key.as_str(), serde_json::to_string(value)?));
        }
        {
            let mut conn = self.lock()?;
            let tx = conn.transaction()?;
            for (key, value) in &encoded {
                tx.execute(UPSERT_SQL, params![key, value])?;
            }
            tx.commit()?;
        }
        debug!(keys = entries.len(), "Committed SQLite transaction");
        self.changes.emit_all(&entries);
        Ok(())
    }

    fn add_listener(&self, key: &str, listener: StoreListener) -> QbResult<()> {
        self.changes.add_listener(key, listener)
    }

    fn backend_name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbreview_core::traits::KeyValueStoreExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(!store.has_key("version").await.unwrap());
        assert!(matches!(
            store.get("version").await,
            Err(QbError::KeyNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("version", json!(1)).await.unwrap();
        store.set("version", json!(2)).await.unwrap();
        assert_eq!(store.get("version").await.unwrap(), json!(2));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_many_and_typed_access() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .set_many(vec![
                ("answerResults".to_string(), json!([{"i": 0, "q": 1, "s": 1, "a": 20241210, "r": 3}])),
                ("answerResultsNextId".to_string(), json!(1)),
            ])
            .await
            .unwrap();

        let next: u64 = store.get_as("answerResultsNextId").await.unwrap();
        assert_eq!(next, 1);
        assert_eq!(
            store.get("answerResults").await.unwrap()[0]["a"],
            json!(20241210)
        );
    }

    #[test]
    fn test_blocking_access() {
        let store = SqliteStore::in_memory().unwrap();
        tokio_test::block_on(store.set("reviewPlansNextId", json!(0))).unwrap();
        assert!(tokio_test::block_on(store.has_key("reviewPlansNextId")).unwrap());
        assert_eq!(store.len().unwrap(), 1);
    }
}
