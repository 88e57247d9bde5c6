//! Key-value storage adapter trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::QbResult;

/// Callback invoked with the new value after a key changes.
pub type StoreListener = Arc<dyn Fn(Value) + Send + Sync>;

/// Core KeyValueStore trait - every storage backend implements this.
///
/// Values are JSON documents. Implementations guard their own state and must
/// be safe to share between tasks, but callers are responsible for running one
/// logical operation at a time against a store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Check whether a key exists.
    async fn has_key(&self, key: &str) -> QbResult<bool>;

    /// Get the value stored under a key.
    ///
    /// Fails with `KeyNotFound` if the key is absent.
    async fn get(&self, key: &str) -> QbResult<Value>;

    /// Store a value under a key.
    async fn set(&self, key: &str, value: Value) -> QbResult<()>;

    /// Store several values at once.
    ///
    /// Either every entry is written or none is.
    async fn set_many(&self, entries: Vec<(String, Value)>) -> QbResult<()>;

    /// Register a listener for changes to a key.
    ///
    /// Listeners run on a spawned task, after the write that triggered them.
    fn add_listener(&self, key: &str, listener: StoreListener) -> QbResult<()>;

    /// Backend name, used in logs.
    fn backend_name(&self) -> &str;
}

/// Typed access on top of [`KeyValueStore`].
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Get a value and deserialize it.
    async fn get_as<T: DeserializeOwned + Send>(&self, key: &str) -> QbResult<T> {
        let value = self.get(key).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize a value and store it.
    async fn set_as<T: Serialize + Sync>(&self, key: &str, value: &T) -> QbResult<()> {
        self.set(key, serde_json::to_value(value)?).await
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
