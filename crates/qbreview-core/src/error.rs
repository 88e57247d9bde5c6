//! Error types for qbreview operations.
//!
//! Every failure is surfaced to the immediate caller. Nothing inside the core
//! retries or falls back to defaults, with the single exception of the
//! version bootstrap performed by [`RecordStore::validate_version`].
//!
//! [`RecordStore::validate_version`]: crate::store::RecordStore::validate_version

use thiserror::Error;

/// Result type alias for qbreview operations.
pub type QbResult<T> = Result<T, QbError>;

/// Main error type for all qbreview operations.
#[derive(Error, Debug)]
pub enum QbError {
    /// A referenced answer or review record does not exist where an update was requested.
    #[error("Record not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        record_id: Option<u64>,
    },

    /// A storage key is absent although the read expects it to exist.
    #[error("Storage key not found: {key}")]
    KeyNotFound { key: String },

    /// Persisted state contradicts itself (e.g. a dangling foreign key).
    #[error("Internal consistency error: {message}")]
    InternalConsistency { message: String },

    /// A value could not be parsed (date, hex identifier, grade).
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// The storage adapter failed.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON document or value.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Records (REC_xxx)
    RecAnswerNotFound,
    RecCorrupted,

    // Storage (STO_xxx)
    StoKeyNotFound,
    StoOperationFailed,
    StoConnectionFailed,

    // Parse (PARSE_xxx)
    ParseInvalidDate,
    ParseInvalidId,
    ParseInvalidGrade,
    ParseInvalidJson,

    // Configuration
    Config,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RecAnswerNotFound => "REC_001",
            ErrorCode::RecCorrupted => "REC_003",
            ErrorCode::StoKeyNotFound => "STO_001",
            ErrorCode::StoOperationFailed => "STO_002",
            ErrorCode::StoConnectionFailed => "STO_003",
            ErrorCode::ParseInvalidDate => "PARSE_001",
            ErrorCode::ParseInvalidId => "PARSE_002",
            ErrorCode::ParseInvalidGrade => "PARSE_003",
            ErrorCode::ParseInvalidJson => "PARSE_004",
            ErrorCode::Config => "CFG_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl QbError {
    /// Create a not found error for an answer record.
    pub fn answer_not_found(id: u64) -> Self {
        Self::NotFound {
            message: format!("Answer result with id '{}' not found", id),
            code: ErrorCode::RecAnswerNotFound,
            record_id: Some(id),
        }
    }

    /// Create a key not found error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Create an internal consistency error.
    pub fn internal_consistency(message: impl Into<String>) -> Self {
        Self::InternalConsistency {
            message: message.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            code: ErrorCode::StoOperationFailed,
            source: None,
        }
    }

    /// Create a storage error wrapping the underlying backend failure.
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            code: ErrorCode::StoOperationFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create an error for a backend that could not be opened.
    pub fn connection_failed(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            code: ErrorCode::StoConnectionFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create a parse error with a specific code.
    pub fn parse(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { code, .. } => *code,
            Self::KeyNotFound { .. } => ErrorCode::StoKeyNotFound,
            Self::InternalConsistency { .. } => ErrorCode::RecCorrupted,
            Self::Parse { code, .. } => *code,
            Self::Storage { code, .. } => *code,
            Self::Configuration(_) => ErrorCode::Config,
            Self::Deserialization(_) => ErrorCode::ParseInvalidJson,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether this error means a referenced record was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::KeyNotFound { .. } => Some("Run `qbreview init` to bootstrap the store"),
            Self::InternalConsistency { .. } => {
                Some("The store is corrupted; restore it from a backup")
            }
            Self::Deserialization(_) => Some("Check that the backup file is a qbreview dump"),
            _ => None,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for QbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::storage_with_source(err.to_string(), err)
    }
}
