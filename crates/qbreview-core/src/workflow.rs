//! Reconciliation of a newly observed answer.
//!
//! After each call the question has exactly one open review record, attached
//! to its most recent answer. The review record of the preceding answer is
//! retired and those of older answers are removed.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::QbResult;
use crate::schedule::next_review_date;
use crate::store::RecordStore;
use crate::types::AnswerGrade;

/// Record an answer and reschedule the question.
///
/// A second answer on the same day replaces the first one. Returns the id of
/// the answer record for `answer_date`.
pub async fn upsert_answer_result_and_review_plan(
    store: &RecordStore,
    question_id: &str,
    set_id: &str,
    answer_date: NaiveDate,
    result: AnswerGrade,
) -> QbResult<u64> {
    let answers = store.get_answer_results_by_question_id(question_id).await?;

    let (today, mut history): (Vec<_>, Vec<_>) = answers
        .into_iter()
        .partition(|answer| answer.answer_date == answer_date);
    history.sort_by_key(|answer| answer.answer_date);
    let today_record = today.first();
    let prev_record = history.last();

    let prev_plan = match prev_record {
        Some(prev) => store.get_review_plan_by_answer_result_id(prev.id).await?,
        None => None,
    };

    let next_date = next_review_date(
        answer_date,
        prev_record.map(|prev| prev.answer_date),
        prev_plan.as_ref().map(|plan| plan.next_date),
        result,
    );
    debug!(
        question_id,
        answer_date = %answer_date,
        prev_answer_date = ?prev_record.map(|prev| prev.answer_date),
        prior_due_date = ?prev_plan.as_ref().map(|plan| plan.next_date),
        result = %result,
        next_date = %next_date,
        "Computed next review date"
    );

    let answer_id = store
        .upsert_answer_result(
            today_record.map(|record| record.id),
            question_id,
            set_id,
            answer_date,
            result,
        )
        .await?;

    if let (Some(prev), Some(plan)) = (prev_record, prev_plan.as_ref()) {
        store
            .upsert_review_plan(prev.id, plan.next_date, true)
            .await?;
    }

    store.upsert_review_plan(answer_id, next_date, false).await?;

    // Keep review records only for today's answer and its predecessor.
    if history.len() >= 2 {
        for stale in history[..history.len() - 1].iter().rev() {
            if let Some(plan) = store.get_review_plan_by_answer_result_id(stale.id).await? {
                debug!(answer_result_id = stale.id, plan_id = plan.id, "Pruning old review plan");
                store.delete_review_plan(plan.id).await?;
            }
        }
    }

    Ok(answer_id)
}
