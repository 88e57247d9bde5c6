//! Configuration system for qbreview.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QbError, QbResult};
use crate::queue::DEFAULT_URL_TEMPLATE;

/// Environment variable selecting the storage backend.
pub const ENV_STORAGE_BACKEND: &str = "QBREVIEW_STORAGE_BACKEND";
/// Environment variable overriding the data path.
pub const ENV_DATA_PATH: &str = "QBREVIEW_DATA_PATH";
/// Environment variable overriding the question URL template.
pub const ENV_URL_TEMPLATE: &str = "QBREVIEW_URL_TEMPLATE";

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local, lost on exit.
    Memory,
    #[default]
    Sqlite,
    /// One JSON document on disk.
    JsonFile,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::JsonFile => "json_file",
        }
    }

    /// File name used under the data directory when no path is configured.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            StorageBackend::Memory | StorageBackend::Sqlite => "store.db",
            StorageBackend::JsonFile => "store.json",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = QbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "json_file" | "json" => Ok(StorageBackend::JsonFile),
            other => Err(QbError::Configuration(format!(
                "Unknown storage backend '{}'. Use memory, sqlite, or json_file",
                other
            ))),
        }
    }
}

/// Where records are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend type.
    pub backend: StorageBackend,
    /// Database or document path. Ignored by the memory backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: None,
        }
    }
}

impl StorageConfig {
    /// The configured path, or the backend's default file in [`default_data_dir`].
    pub fn data_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| default_data_dir().join(self.backend.default_file_name()))
    }
}

/// Main qbreview configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QbConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Link template for due reviews; `{setId}` and `{questionId}` are substituted.
    pub question_url_template: String,
}

impl Default for QbConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            question_url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

/// `~/.qbreview`, or `.qbreview` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".qbreview"))
        .unwrap_or_else(|| PathBuf::from(".qbreview"))
}

impl QbConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> QbResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| QbError::Configuration(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| QbError::Configuration(e.to_string()))
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| QbError::Configuration(e.to_string()))
            }
            _ => Err(QbError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> QbResult<Self> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `QBREVIEW_*` overrides looked up through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> QbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup(ENV_STORAGE_BACKEND) {
            self.storage.backend = backend.parse()?;
        }
        if let Some(path) = lookup(ENV_DATA_PATH) {
            self.storage.path = Some(PathBuf::from(path));
        }
        if let Some(template) = lookup(ENV_URL_TEMPLATE) {
            self.question_url_template = template;
        }
        Ok(self)
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> QbConfigBuilder {
        QbConfigBuilder::default()
    }
}

/// Builder for QbConfig.
#[derive(Default)]
pub struct QbConfigBuilder {
    config: QbConfig,
}

impl QbConfigBuilder {
    /// Set storage configuration.
    pub fn storage(mut self, config: StorageConfig) -> Self {
        self.config.storage = config;
        self
    }

    /// Set storage backend.
    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage.backend = backend;
        self
    }

    /// Set data path.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage.path = Some(path.into());
        self
    }

    /// Set question URL template.
    pub fn question_url_template(mut self, template: impl Into<String>) -> Self {
        self.config.question_url_template = template.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> QbConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = QbConfig::default();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.storage.data_path().ends_with(".qbreview/store.db"));
        assert_eq!(config.question_url_template, DEFAULT_URL_TEMPLATE);
    }

    #[test]
    fn test_builder() {
        let config = QbConfig::builder()
            .backend(StorageBackend::JsonFile)
            .path("/tmp/qb.json")
            .question_url_template("https://example.test/{questionId}")
            .build();
        assert_eq!(config.storage.backend, StorageBackend::JsonFile);
        assert_eq!(config.storage.data_path(), PathBuf::from("/tmp/qb.json"));
        assert_eq!(config.question_url_template, "https://example.test/{questionId}");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_STORAGE_BACKEND, "memory"),
            (ENV_DATA_PATH, "/var/lib/qbreview/store.db"),
        ]
        .into_iter()
        .collect();

        let config = QbConfig::default()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.data_path(), PathBuf::from("/var/lib/qbreview/store.db"));
        assert_eq!(config.question_url_template, DEFAULT_URL_TEMPLATE);
    }

    #[test]
    fn test_default_file_follows_backend() {
        let config = QbConfig::default()
            .with_overrides(|name| (name == ENV_STORAGE_BACKEND).then(|| "json_file".to_string()))
            .unwrap();
        assert_eq!(config.storage.path, None);
        assert!(config.storage.data_path().ends_with(".qbreview/store.json"));

        let sqlite = QbConfig::builder().backend(StorageBackend::Sqlite).build();
        assert!(sqlite.storage.data_path().ends_with(".qbreview/store.db"));
    }

    #[test]
    fn test_unknown_backend_override_fails() {
        let result = QbConfig::default().with_overrides(|name| {
            (name == ENV_STORAGE_BACKEND).then(|| "postgres".to_string())
        });
        assert!(matches!(result, Err(QbError::Configuration(_))));
    }

    #[test]
    fn test_backend_names() {
        assert_eq!("json-file".parse::<StorageBackend>().unwrap(), StorageBackend::JsonFile);
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!(StorageBackend::JsonFile.as_str(), "json_file");
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "question_url_template = \"https://example.test/{{setId}}\"\n\n[storage]\nbackend = \"json_file\"\npath = \"/tmp/qb.json\""
        )
        .unwrap();

        let config = QbConfig::from_file(file.path()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::JsonFile);
        assert_eq!(config.storage.data_path(), PathBuf::from("/tmp/qb.json"));
        assert_eq!(config.question_url_template, "https://example.test/{setId}");
    }

    #[test]
    fn test_from_yaml_file_uses_defaults_for_missing_fields() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "storage:\n  backend: memory").unwrap();

        let config = QbConfig::from_file(file.path()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, None);
        assert_eq!(config.question_url_template, DEFAULT_URL_TEMPLATE);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            QbConfig::from_file(file.path()),
            Err(QbError::Configuration(_))
        ));
    }
}
