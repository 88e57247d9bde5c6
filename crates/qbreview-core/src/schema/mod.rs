//! Persisted layout of the record store.
//!
//! The root is spread over five keys. Their values are encoded either in the
//! legacy V1 format or the compact V2 format, selected by the `version` key.

pub mod codec;
mod migration;
mod v1;
mod v2;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorCode, QbError, QbResult};

pub use migration::convert_v1_to_v2;
pub use v1::{V1AnswerRecord, V1ReviewRecord, V1Root};
pub use v2::{V2AnswerRecord, V2ReviewRecord, V2Root};

/// Version written by this library.
pub const CURRENT_VERSION: u32 = 2;

pub const KEY_VERSION: &str = "version";
pub const KEY_ANSWER_RESULTS: &str = "answerResults";
pub const KEY_ANSWER_RESULTS_NEXT_ID: &str = "answerResultsNextId";
pub const KEY_REVIEW_PLANS: &str = "reviewPlans";
pub const KEY_REVIEW_PLANS_NEXT_ID: &str = "reviewPlansNextId";

/// Every root key, in dump order.
pub const ROOT_KEYS: [&str; 5] = [
    KEY_VERSION,
    KEY_ANSWER_RESULTS,
    KEY_ANSWER_RESULTS_NEXT_ID,
    KEY_REVIEW_PLANS,
    KEY_REVIEW_PLANS_NEXT_ID,
];

/// The five root values without interpretation.
///
/// Used for dump and load, which move the root as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootDocument {
    pub version: Value,
    pub answer_results: Value,
    pub answer_results_next_id: Value,
    pub review_plans: Value,
    pub review_plans_next_id: Value,
}

impl RootDocument {
    /// Build from key-value pairs; every root key must be present.
    pub fn from_entries(entries: Vec<(String, Value)>) -> QbResult<Self> {
        let map: serde_json::Map<String, Value> = entries.into_iter().collect();
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Split into key-value pairs in dump order.
    pub fn into_entries(self) -> Vec<(String, Value)> {
        vec![
            (KEY_VERSION.to_string(), self.version),
            (KEY_ANSWER_RESULTS.to_string(), self.answer_results),
            (KEY_ANSWER_RESULTS_NEXT_ID.to_string(), self.answer_results_next_id),
            (KEY_REVIEW_PLANS.to_string(), self.review_plans),
            (KEY_REVIEW_PLANS_NEXT_ID.to_string(), self.review_plans_next_id),
        ]
    }

    /// Parse a serialized dump.
    pub fn parse(document: &str) -> QbResult<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Compact JSON with keys in dump order.
    pub fn to_json(&self) -> QbResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A root tagged by its `version` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedRoot {
    V1(V1Root),
    V2(V2Root),
}

impl VersionedRoot {
    /// Interpret a raw root according to its version.
    pub fn from_document(document: RootDocument) -> QbResult<Self> {
        let value = serde_json::to_value(document)?;
        let version = value
            .get(KEY_VERSION)
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                QbError::parse(ErrorCode::ParseInvalidJson, "version is not an integer")
            })?;

        match version {
            1 => Ok(Self::V1(serde_json::from_value(value)?)),
            2 => Ok(Self::V2(serde_json::from_value(value)?)),
            other => Err(QbError::parse(
                ErrorCode::ParseInvalidJson,
                format!("unsupported schema version {}", other),
            )),
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Self::V1(root) => root.version,
            Self::V2(root) => root.version,
        }
    }

    /// Bring the root up to the current encoding.
    pub fn into_current(self) -> QbResult<V2Root> {
        match self {
            Self::V1(root) => convert_v1_to_v2(root),
            Self::V2(root) => Ok(root),
        }
    }
}

impl V2Root {
    /// Encode as store entries in dump order.
    pub fn to_entries(&self) -> QbResult<Vec<(String, Value)>> {
        Ok(vec![
            (KEY_VERSION.to_string(), serde_json::to_value(self.version)?),
            (
                KEY_ANSWER_RESULTS.to_string(),
                serde_json::to_value(&self.answer_results)?,
            ),
            (
                KEY_ANSWER_RESULTS_NEXT_ID.to_string(),
                serde_json::to_value(self.answer_results_next_id)?,
            ),
            (
                KEY_REVIEW_PLANS.to_string(),
                serde_json::to_value(&self.review_plans)?,
            ),
            (
                KEY_REVIEW_PLANS_NEXT_ID.to_string(),
                serde_json::to_value(self.review_plans_next_id)?,
            ),
        ])
    }
}
