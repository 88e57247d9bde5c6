//! qbreview-stores - Persistent key-value store backends for qbreview.
//!
//! # Supported Backends
//!
//! - **SQLite** (feature: `sqlite`, default) - one row per key in a local database
//! - **JSON file** - the whole map in one JSON document
//!
//! The in-memory backend lives in `qbreview-core`.

mod factory;
mod json_file;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use factory::StoreFactory;
pub use json_file::JsonFileStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
