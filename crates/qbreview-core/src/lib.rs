//! qbreview-core - Core library for qbreview.
//!
//! This crate provides the review date policy, the versioned record schema,
//! the record store over a pluggable key-value adapter, and the workflow that
//! reconciles a newly observed answer with the existing review schedule.
//!
//! # Example
//!
//! ```ignore
//! use qbreview_core::{upsert_answer_result_and_review_plan, AnswerGrade, MemoryStore, RecordStore};
//!
//! let store = RecordStore::new(Arc::new(MemoryStore::new()));
//! store.validate_version().await?;
//!
//! // Record an answer and reschedule the question
//! let id = upsert_answer_result_and_review_plan(&store, "114C05", "114C", today, AnswerGrade::Correct).await?;
//!
//! // What is due today
//! let due = store.get_uncompleted_review_plans(today).await?;
//! ```

pub mod backup;
pub mod config;
pub mod error;
pub mod kv;
pub mod queue;
pub mod schedule;
pub mod schema;
pub mod store;
pub mod traits;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use backup::{export_backup, import_backup};
pub use config::{QbConfig, StorageBackend, StorageConfig};
pub use error::{ErrorCode, QbError, QbResult};
pub use kv::{ChangeBus, MemoryStore, StorageChange};
pub use queue::{due_reviews, DueReview};
pub use schedule::next_review_date;
pub use schema::{convert_v1_to_v2, V1Root, V2Root, VersionedRoot};
pub use store::RecordStore;
pub use traits::{KeyValueStore, KeyValueStoreExt, StoreListener};
pub use types::{AnswerGrade, AnswerRecord, PendingReview, ReviewRecord};
pub use workflow::upsert_answer_result_and_review_plan;
