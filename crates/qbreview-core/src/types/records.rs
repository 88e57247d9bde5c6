//! Decoded answer and review records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AnswerGrade;

/// One observation of a learner answering a question on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    /// Unique identifier, assigned from the `answerResultsNextId` counter.
    pub id: u64,
    /// Hex-like question token, e.g. `"114C05"`.
    pub question_id: String,
    /// Hex-like question set token.
    pub set_id: String,
    /// Day the answer was given.
    pub answer_date: NaiveDate,
    /// Quality of the answer.
    pub result: AnswerGrade,
}

/// Scheduling state attached to exactly one [`AnswerRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// Unique identifier, assigned from the `reviewPlansNextId` counter.
    pub id: u64,
    /// Id of the answer record this plan belongs to.
    pub answer_result_id: u64,
    /// Due date of the next review.
    pub next_date: NaiveDate,
    /// True once superseded by a later answer.
    pub completed: bool,
}

impl ReviewRecord {
    /// Whether the review is open and due on or before `day`.
    pub fn is_due_by(&self, day: NaiveDate) -> bool {
        !self.completed && self.next_date <= day
    }
}

/// A review record joined with the answer record it schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReview {
    #[serde(flatten)]
    pub plan: ReviewRecord,
    pub answer_result: AnswerRecord,
}
