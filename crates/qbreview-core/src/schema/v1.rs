//! Legacy human-readable wire format (`version: 1`).

use serde::{Deserialize, Serialize};

use crate::types::AnswerGrade;

/// V1 answer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V1AnswerRecord {
    pub id: u64,
    pub question_id: String,
    pub set_id: String,
    /// `"YYYY-MM-DD"`
    pub answer_date: String,
    pub result: AnswerGrade,
}

/// V1 review record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V1ReviewRecord {
    pub id: u64,
    pub answer_result_id: u64,
    /// `"YYYY-MM-DD"`
    pub next_date: String,
    pub completed: bool,
}

/// Full V1 root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V1Root {
    pub version: u32,
    pub answer_results: Vec<V1AnswerRecord>,
    pub answer_results_next_id: u64,
    pub review_plans: Vec<V1ReviewRecord>,
    pub review_plans_next_id: u64,
}

impl Default for V1Root {
    fn default() -> Self {
        Self {
            version: 1,
            answer_results: Vec::new(),
            answer_results_next_id: 0,
            review_plans: Vec::new(),
            review_plans_next_id: 0,
        }
    }
}
