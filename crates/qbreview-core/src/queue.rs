//! Due-review listing for presentation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::QbResult;
use crate::store::RecordStore;

/// Default link to a question's answer page.
pub const DEFAULT_URL_TEMPLATE: &str = "https://qb.medilink-study.com/Answer/{setId}";

/// A review that is due, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueReview {
    pub question_id: String,
    pub set_id: String,
    pub url: String,
    pub review_limit: NaiveDate,
}

/// Fill `{setId}` and `{questionId}` placeholders.
pub fn render_url(template: &str, question_id: &str, set_id: &str) -> String {
    template
        .replace("{setId}", set_id)
        .replace("{questionId}", question_id)
}

/// Reviews due on or before `today`, earliest first.
pub async fn due_reviews(
    store: &RecordStore,
    today: NaiveDate,
    url_template: &str,
) -> QbResult<Vec<DueReview>> {
    let pending = store.get_uncompleted_review_plans(today).await?;
    Ok(pending
        .into_iter()
        .map(|review| {
            let answer = review.answer_result;
            DueReview {
                url: render_url(url_template, &answer.question_id, &answer.set_id),
                question_id: answer.question_id,
                set_id: answer.set_id,
                review_limit: review.plan.next_date,
            }
        })
        .collect())
}
