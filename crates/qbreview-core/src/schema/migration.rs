//! V1 to V2 conversion.

use super::codec::{encode_date, encode_hex_id, parse_iso_date};
use super::v1::{V1AnswerRecord, V1ReviewRecord, V1Root};
use super::v2::{V2AnswerRecord, V2ReviewRecord, V2Root};
use super::CURRENT_VERSION;
use crate::error::QbResult;

/// Convert a V1 root into the V2 encoding.
///
/// Ids and counters carry over unchanged. Fails on the first date or
/// identifier that does not parse.
pub fn convert_v1_to_v2(root: V1Root) -> QbResult<V2Root> {
    let answer_results = root
        .answer_results
        .iter()
        .map(convert_answer)
        .collect::<QbResult<Vec<_>>>()?;
    let review_plans = root
        .review_plans
        .iter()
        .map(convert_review)
        .collect::<QbResult<Vec<_>>>()?;

    Ok(V2Root {
        version: CURRENT_VERSION,
        answer_results,
        answer_results_next_id: root.answer_results_next_id,
        review_plans,
        review_plans_next_id: root.review_plans_next_id,
    })
}

fn convert_answer(record: &V1AnswerRecord) -> QbResult<V2AnswerRecord> {
    Ok(V2AnswerRecord {
        i: record.id,
        q: encode_hex_id(&record.question_id)?,
        s: encode_hex_id(&record.set_id)?,
        a: encode_date(parse_iso_date(&record.answer_date)?)?,
        r: record.result,
    })
}

fn convert_review(plan: &V1ReviewRecord) -> QbResult<V2ReviewRecord> {
    Ok(V2ReviewRecord {
        i: plan.id,
        a: plan.answer_result_id,
        n: encode_date(parse_iso_date(&plan.next_date)?)?,
        c: u8::from(plan.completed),
    })
}
