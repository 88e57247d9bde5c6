//! In-memory key-value store.
//!
//! Used as the default backend for tests and short-lived sessions. Values are
//! cloned on the way in and out, so callers never share state with the store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::ChangeBus;
use crate::error::{QbError, QbResult};
use crate::traits::{KeyValueStore, StoreListener};

/// HashMap-backed store.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
    changes: ChangeBus,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let data = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            data: RwLock::new(data),
            changes: ChangeBus::new(),
        }
    }

    /// Copy of everything in the store.
    pub async fn snapshot(&self) -> HashMap<String, Value> {
        self.data.read().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn has_key(&self, key: &str) -> QbResult<bool> {
        Ok(self.data.read().await.contains_key(key))
    }

    async fn get(&self, key: &str) -> QbResult<Value> {
        self.data
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| QbError::key_not_found(key))
    }

    async fn set(&self, key: &str, value: Value) -> QbResult<()> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.clone());
        self.changes.emit(key, value);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> QbResult<()> {
        {
            let mut data = self.data.write().await;
            for (key, value) in &entries {
                data.insert(key.clone(), value.clone());
            }
        }
        self.changes.emit_all(&entries);
        Ok(())
    }

    fn add_listener(&self, key: &str, listener: StoreListener) -> QbResult<()> {
        self.changes.add_listener(key, listener)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::KeyValueStoreExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_key_fails() {
        let store = MemoryStore::new();
        assert!(!store.has_key("version").await.unwrap());
        let err = store.get("version").await.unwrap_err();
        assert!(matches!(err, QbError::KeyNotFound { ref key } if key == "version"));
    }

    #[tokio::test]
    async fn test_set_and_get_typed() {
        let store = MemoryStore::new();
        store.set_as("answerResultsNextId", &7u64).await.unwrap();
        let next: u64 = store.get_as("answerResultsNextId").await.unwrap();
        assert_eq!(next, 7);
    }

    #[tokio::test]
    async fn test_set_many_writes_all_entries() {
        let store = MemoryStore::new();
        store
            .set_many(vec![
                ("version".to_string(), json!(2)),
                ("reviewPlans".to_string(), json!([])),
            ])
            .await
            .unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["version"], json!(2));
    }

    #[tokio::test]
    async fn test_with_entries() {
        let store = MemoryStore::with_entries([("version", json!(1))]);
        assert_eq!(store.get("version").await.unwrap(), json!(1));
    }

    #[test]
    fn test_blocking_access() {
        let store = MemoryStore::new();
        tokio_test::block_on(store.set("reviewPlansNextId", json!(3))).unwrap();
        let value = tokio_test::block_on(store.get("reviewPlansNextId")).unwrap();
        assert_eq!(value, json!(3));
    }
}
