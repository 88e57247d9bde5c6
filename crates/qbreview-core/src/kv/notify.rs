//! Change notification for storage backends using a tokio broadcast channel.
//!
//! Backends emit a [`StorageChange`] after each committed write. Listeners
//! registered through [`ChangeBus::add_listener`] run on their own task and
//! only see changes to the key they asked for. Slow listeners miss changes
//! rather than blocking writers.

use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::{QbError, QbResult};
use crate::traits::StoreListener;

/// Default channel capacity
const DEFAULT_CAPACITY: usize = 256;

/// A committed change to one key.
#[derive(Debug, Clone)]
pub struct StorageChange {
    pub key: String,
    pub new_value: Value,
}

/// Broadcast bus for storage changes.
#[derive(Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<StorageChange>,
}

impl ChangeBus {
    /// Create a new bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new bus with custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit a change. Dropped silently when nobody listens.
    pub fn emit(&self, key: impl Into<String>, new_value: Value) {
        let _ = self.sender.send(StorageChange {
            key: key.into(),
            new_value,
        });
    }

    /// Emit one change per entry.
    pub fn emit_all(&self, entries: &[(String, Value)]) {
        for (key, value) in entries {
            self.emit(key.clone(), value.clone());
        }
    }

    /// Spawn a task that calls `listener` for each change to `key`.
    ///
    /// Requires a running tokio runtime.
    pub fn add_listener(&self, key: &str, listener: StoreListener) -> QbResult<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| QbError::Internal(format!("no tokio runtime for listener: {}", e)))?;

        let mut receiver = self.sender.subscribe();
        let key = key.to_string();
        handle.spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(change) if change.key == key => listener(change.new_value),
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(key = %key, "Storage listener lagged by {} changes", n);
                        continue;
                    }
                }
            }
        });
        Ok(())
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
