//! Compact wire format (`version: 2`).
//!
//! Field names are single letters. Answer records: `i` id, `q` question,
//! `s` set, `a` answer date, `r` result. Review records: `i` id, `a` answer
//! record id, `n` next date, `c` completed flag (0 or 1).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::codec::{decode_date, decode_hex_id, encode_date, encode_hex_id};
use crate::error::QbResult;
use crate::types::{AnswerGrade, AnswerRecord, ReviewRecord};

/// V2 answer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V2AnswerRecord {
    pub i: u64,
    pub q: u64,
    pub s: u64,
    pub a: u32,
    pub r: AnswerGrade,
}

impl V2AnswerRecord {
    /// Encode caller-facing fields.
    pub fn encode(
        id: u64,
        question_id: &str,
        set_id: &str,
        answer_date: NaiveDate,
        result: AnswerGrade,
    ) -> QbResult<Self> {
        Ok(Self {
            i: id,
            q: encode_hex_id(question_id)?,
            s: encode_hex_id(set_id)?,
            a: encode_date(answer_date)?,
            r: result,
        })
    }

    pub fn decode(&self) -> QbResult<AnswerRecord> {
        Ok(AnswerRecord {
            id: self.i,
            question_id: decode_hex_id(self.q),
            set_id: decode_hex_id(self.s),
            answer_date: decode_date(self.a)?,
            result: self.r,
        })
    }
}

/// V2 review record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V2ReviewRecord {
    pub i: u64,
    pub a: u64,
    pub n: u32,
    pub c: u8,
}

impl V2ReviewRecord {
    pub fn encode(
        id: u64,
        answer_result_id: u64,
        next_date: NaiveDate,
        completed: bool,
    ) -> QbResult<Self> {
        Ok(Self {
            i: id,
            a: answer_result_id,
            n: encode_date(next_date)?,
            c: u8::from(completed),
        })
    }

    pub fn decode(&self) -> QbResult<ReviewRecord> {
        Ok(ReviewRecord {
            id: self.i,
            answer_result_id: self.a,
            next_date: decode_date(self.n)?,
            completed: self.is_completed(),
        })
    }

    pub fn is_completed(&self) -> bool {
        self.c != 0
    }
}

/// Full V2 root.
///
/// Field order matches the order of keys in a dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Root {
    pub version: u32,
    pub answer_results: Vec<V2AnswerRecord>,
    pub answer_results_next_id: u64,
    pub review_plans: Vec<V2ReviewRecord>,
    pub review_plans_next_id: u64,
}

impl Default for V2Root {
    fn default() -> Self {
        Self {
            version: 2,
            answer_results: Vec::new(),
            answer_results_next_id: 0,
            review_plans: Vec::new(),
            review_plans_next_id: 0,
        }
    }
}
