//! Factory for creating key-value stores from configuration.

use std::sync::Arc;

use qbreview_core::config::{StorageBackend, StorageConfig};
use qbreview_core::error::{QbError, QbResult};
use qbreview_core::kv::MemoryStore;
use qbreview_core::traits::KeyValueStore;
use tracing::info;

use crate::JsonFileStore;

/// Factory for creating key-value stores.
pub struct StoreFactory;

impl StoreFactory {
    /// Create a store from the given configuration.
    pub async fn create(config: &StorageConfig) -> QbResult<Arc<dyn KeyValueStore>> {
        let path = config.data_path();
        let store: Arc<dyn KeyValueStore> = match config.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),

            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => Arc::new(crate::SqliteStore::new(&path)?),

            #[cfg(not(feature = "sqlite"))]
            StorageBackend::Sqlite => {
                return Err(QbError::Configuration(
                    "SQLite backend not enabled. Enable the 'sqlite' feature.".to_string(),
                ))
            }

            StorageBackend::JsonFile => Arc::new(JsonFileStore::open(&path).await?),
        };

        info!(
            backend = store.backend_name(),
            path = %path.display(),
            "Opened record storage"
        );
        Ok(store)
    }

    /// List backends compiled into this build.
    pub fn available_backends() -> Vec<StorageBackend> {
        let mut backends = vec![StorageBackend::Memory, StorageBackend::JsonFile];
        if cfg!(feature = "sqlite") {
            backends.push(StorageBackend::Sqlite);
        }
        backends
    }

    /// Check that a backend can be created in this build.
    pub fn ensure_available(backend: StorageBackend) -> QbResult<()> {
        if Self::available_backends().contains(&backend) {
            Ok(())
        } else {
            Err(QbError::Configuration(format!(
                "Storage backend '{}' is not available in this build",
                backend.as_str()
            )))
        }
    }
}
