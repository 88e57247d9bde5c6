use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use qbreview_core::{QbConfig, QbError, RecordStore};
use qbreview_stores::StoreFactory;
use tracing::debug;

/// Shared state for CLI commands
pub struct App {
    pub config: QbConfig,
    pub store: RecordStore,
    /// Schema version found when the store was opened.
    pub version: u32,
}

impl App {
    /// Resolve configuration, open the store and bring its schema up to date.
    pub async fn open(config_path: Option<&Path>, data_path: Option<PathBuf>) -> Result<Self> {
        let config = load_config(config_path, data_path)?;
        debug!(?config, "Resolved configuration");

        StoreFactory::ensure_available(config.storage.backend)?;
        let kv = StoreFactory::create(&config.storage).await.with_context(|| {
            format!("Failed to open store at {}", config.storage.data_path().display())
        })?;
        Self::with_store(config, RecordStore::new(kv)).await
    }

    /// Wrap an already opened store.
    pub async fn with_store(config: QbConfig, store: RecordStore) -> Result<Self> {
        let version = store
            .validate_version()
            .await
            .context("Failed to validate store schema")?;
        Ok(Self {
            config,
            store,
            version,
        })
    }
}

/// File settings first, then `QBREVIEW_*` variables, then `--data`.
fn load_config(config_path: Option<&Path>, data_path: Option<PathBuf>) -> Result<QbConfig> {
    let mut config = match config_path {
        Some(path) => QbConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?
            .with_overrides(|name| std::env::var(name).ok())?,
        None => QbConfig::from_env()?,
    };
    if let Some(path) = data_path {
        config.storage.path = Some(path);
    }
    Ok(config)
}

/// Hint for the first library error in the chain that carries one.
pub fn suggestion(err: &anyhow::Error) -> Option<&str> {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<QbError>())
        .find_map(QbError::suggestion)
}
