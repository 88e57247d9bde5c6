//! Single-document JSON file store.
//!
//! The whole map lives in memory and is rewritten to disk after each change.
//! Writes go to a sibling temp file which is then renamed over the target, so
//! a crash never leaves a half-written document behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use qbreview_core::error::{ErrorCode, QbError, QbResult};
use qbreview_core::kv::ChangeBus;
use qbreview_core::traits::{KeyValueStore, StoreListener};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

/// JSON document store.
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<Map<String, Value>>,
    changes: ChangeBus,
}

impl JsonFileStore {
    /// Open a document, or start empty if the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> QbResult<Self> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str::<Value>(&content)? {
                Value::Object(map) => map,
                _ => {
                    return Err(QbError::parse(
                        ErrorCode::ParseInvalidJson,
                        format!("{} does not contain a JSON object", path.display()),
                    ))
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = data.len(), "Opened JSON file store");

        Ok(Self {
            path,
            data: RwLock::new(data),
            changes: ChangeBus::new(),
        })
    }

    async fn persist(&self, data: &Map<String, Value>) -> QbResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec_pretty(data)?;
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Apply entries to a copy, persist it, then swap it in.
    async fn commit(&self, entries: &[(String, Value)]) -> QbResult<()> {
        let mut data = self.data.write().await;
        let mut next = data.clone();
        for (key, value) in entries {
            next.insert(key.clone(), value.clone());
        }
        self.persist(&next).await?;
        *data = next;
        Ok(())
    }
}

/// `store.json` -> `store.json.tmp`, so paths differing only by extension
/// never share a temp file.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
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
        let entries = vec![(key.to_string(), value)];
        self.commit(&entries).await?;
        self.changes.emit_all(&entries);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> QbResult<()> {
        self.commit(&entries).await?;
        self.changes.emit_all(&entries);
        Ok(())
    }

    fn add_listener(&self, key: &str, listener: StoreListener) -> QbResult<()> {
        self.changes.add_listener(key, listener)
    }

    fn backend_name(&self) -> &str {
        "json_file"
    }
}
