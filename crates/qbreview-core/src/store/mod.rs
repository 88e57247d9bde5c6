//! Record store over a key-value adapter.
//!
//! Records are persisted in the V2 encoding and handed to callers decoded.
//! Each mutating operation reads what it needs, validates, then commits every
//! changed key with a single `set_many`. A failed validation writes nothing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{QbError, QbResult};
use crate::schema::codec::{encode_date, encode_hex_id};
use crate::schema::{
    RootDocument, V2AnswerRecord, V2ReviewRecord, V2Root, VersionedRoot, CURRENT_VERSION,
    KEY_ANSWER_RESULTS, KEY_ANSWER_RESULTS_NEXT_ID, KEY_REVIEW_PLANS, KEY_REVIEW_PLANS_NEXT_ID,
    KEY_VERSION, ROOT_KEYS,
};
use crate::traits::{KeyValueStore, KeyValueStoreExt};
use crate::types::{AnswerGrade, AnswerRecord, PendingReview, ReviewRecord};

/// Answer and review records persisted in a [`KeyValueStore`].
#[derive(Clone)]
pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Bootstrap an empty store or migrate a legacy one.
    ///
    /// Returns the schema version found after the check. Versions newer than
    /// the current one are left untouched.
    pub async fn validate_version(&self) -> QbResult<u32> {
        if !self.kv.has_key(KEY_VERSION).await? {
            info!(
                version = CURRENT_VERSION,
                "No schema version found, initializing empty store"
            );
            self.kv.set_many(V2Root::default().to_entries()?).await?;
            return Ok(CURRENT_VERSION);
        }

        let version = self.version().await?;
        match version {
            1 => {
                info!("Migrating store from schema version 1 to {}", CURRENT_VERSION);
                let legacy = VersionedRoot::from_document(self.read_document().await?)?;
                let migrated = legacy.into_current()?;
                self.kv.set_many(migrated.to_entries()?).await?;

                let confirmed = self.version().await?;
                if confirmed != CURRENT_VERSION {
                    return Err(QbError::Internal(format!(
                        "migration left schema version at {}",
                        confirmed
                    )));
                }
                info!(
                    answers = migrated.answer_results.len(),
                    reviews = migrated.review_plans.len(),
                    "Migration complete"
                );
                Ok(confirmed)
            }
            CURRENT_VERSION => Ok(version),
            other => {
                warn!(version = other, "Unknown schema version, leaving store untouched");
                Ok(other)
            }
        }
    }

    /// Stored schema version.
    pub async fn version(&self) -> QbResult<u32> {
        self.kv.get_as(KEY_VERSION).await
    }

    /// Create or update an answer record.
    ///
    /// With `id`, the record carrying that id is overwritten in place and
    /// `NotFound` is returned if there is none. Without `id`, a record is
    /// appended under the next id counter, which is then incremented.
    pub async fn upsert_answer_result(
        &self,
        id: Option<u64>,
        question_id: &str,
        set_id: &str,
        answer_date: NaiveDate,
        result: AnswerGrade,
    ) -> QbResult<u64> {
        debug!(
            id = ?id,
            question_id,
            set_id,
            answer_date = %answer_date,
            result = %result,
            "Upserting answer result"
        );
        let mut answer_results = self.answer_results().await?;
        let next_id: u64 = self.kv.get_as(KEY_ANSWER_RESULTS_NEXT_ID).await?;

        match id {
            Some(id) => {
                let slot = answer_results
                    .iter_mut()
                    .find(|record| record.i == id)
                    .ok_or_else(|| QbError::answer_not_found(id))?;
                *slot = V2AnswerRecord::encode(id, question_id, set_id, answer_date, result)?;

                self.kv
                    .set_many(vec![entry(KEY_ANSWER_RESULTS, &answer_results)?])
                    .await?;
                Ok(id)
            }
            None => {
                answer_results.push(V2AnswerRecord::encode(
                    next_id,
                    question_id,
                    set_id,
                    answer_date,
                    result,
                )?);

                self.kv
                    .set_many(vec![
                        entry(KEY_ANSWER_RESULTS, &answer_results)?,
                        entry(KEY_ANSWER_RESULTS_NEXT_ID, &(next_id + 1))?,
                    ])
                    .await?;
                Ok(next_id)
            }
        }
    }

    /// All answer records for a question, in insertion order.
    pub async fn get_answer_results_by_question_id(
        &self,
        question_id: &str,
    ) -> QbResult<Vec<AnswerRecord>> {
        let wanted = encode_hex_id(question_id)?;
        self.answer_results()
            .await?
            .iter()
            .filter(|record| record.q == wanted)
            .map(V2AnswerRecord::decode)
            .collect()
    }

    /// Create or update the review record of an answer record.
    ///
    /// Fails with `NotFound` if the answer record does not exist.
    pub async fn upsert_review_plan(
        &self,
        answer_result_id: u64,
        next_date: NaiveDate,
        completed: bool,
    ) -> QbResult<u64> {
        debug!(
            answer_result_id,
            next_date = %next_date,
            completed,
            "Upserting review plan"
        );
        let answer_results = self.answer_results().await?;
        if !answer_results.iter().any(|record| record.i == answer_result_id) {
            return Err(QbError::answer_not_found(answer_result_id));
        }
        let encoded_date = encode_date(next_date)?;

        let mut review_plans = self.review_plans().await?;
        let next_id: u64 = self.kv.get_as(KEY_REVIEW_PLANS_NEXT_ID).await?;

        if let Some(plan) = review_plans
            .iter_mut()
            .find(|plan| plan.a == answer_result_id)
        {
            plan.n = encoded_date;
            plan.c = u8::from(completed);
            let id = plan.i;

            self.kv
                .set_many(vec![entry(KEY_REVIEW_PLANS, &review_plans)?])
                .await?;
            return Ok(id);
        }

        review_plans.push(V2ReviewRecord::encode(
            next_id,
            answer_result_id,
            next_date,
            completed,
        )?);
        self.kv
            .set_many(vec![
                entry(KEY_REVIEW_PLANS, &review_plans)?,
                entry(KEY_REVIEW_PLANS_NEXT_ID, &(next_id + 1))?,
            ])
            .await?;
        Ok(next_id)
    }

    /// The review record of an answer record, if any.
    pub async fn get_review_plan_by_answer_result_id(
        &self,
        answer_result_id: u64,
    ) -> QbResult<Option<ReviewRecord>> {
        self.review_plans()
            .await?
            .iter()
            .find(|plan| plan.a == answer_result_id)
            .map(V2ReviewRecord::decode)
            .transpose()
    }

    /// Open review records due on or before `until_or_equal_to`, joined with
    /// their answer records and sorted by due date.
    ///
    /// Records sharing a due date keep their store order.
    pub async fn get_uncompleted_review_plans(
        &self,
        until_or_equal_to: NaiveDate,
    ) -> QbResult<Vec<PendingReview>> {
        let review_plans = self.review_plans().await?;
        let answer_results = self.answer_results().await?;
        let by_id: HashMap<u64, &V2AnswerRecord> =
            answer_results.iter().map(|record| (record.i, record)).collect();

        let mut open = Vec::new();
        for plan in &review_plans {
            let plan = plan.decode()?;
            if plan.is_due_by(until_or_equal_to) {
                open.push(plan);
            }
        }
        open.sort_by_key(|plan| plan.next_date);

        open.into_iter()
            .map(|plan| -> QbResult<PendingReview> {
                let answer = by_id.get(&plan.answer_result_id).ok_or_else(|| {
                    QbError::internal_consistency(format!(
                        "review plan {} references missing answer result {}",
                        plan.id, plan.answer_result_id
                    ))
                })?;
                Ok(PendingReview {
                    plan,
                    answer_result: answer.decode()?,
                })
            })
            .collect()
    }

    /// Remove a review record. Absent ids are ignored.
    pub async fn delete_review_plan(&self, id: u64) -> QbResult<()> {
        let mut review_plans = self.review_plans().await?;
        match review_plans.iter().position(|plan| plan.i == id) {
            Some(index) => {
                review_plans.remove(index);
                debug!(id, "Deleting review plan");
                self.kv
                    .set_many(vec![entry(KEY_REVIEW_PLANS, &review_plans)?])
                    .await
            }
            None => Ok(()),
        }
    }

    /// Serialize the whole root as compact JSON.
    pub async fn dump(&self) -> QbResult<String> {
        self.read_document().await?.to_json()
    }

    /// Replace the whole root from a dump.
    ///
    /// Only the document structure is checked. A document that does not parse
    /// leaves the store untouched.
    pub async fn load(&self, dump: &str) -> QbResult<()> {
        let document = RootDocument::parse(dump)?;
        info!("Loading root from dump");
        self.kv.set_many(document.into_entries()).await
    }

    /// Decoded copy of the whole V2 root.
    pub async fn read_root(&self) -> QbResult<V2Root> {
        match VersionedRoot::from_document(self.read_document().await?)? {
            VersionedRoot::V2(root) => Ok(root),
            VersionedRoot::V1(_) => Err(QbError::Internal(
                "store still uses schema version 1; run validate_version first".to_string(),
            )),
        }
    }

    async fn read_document(&self) -> QbResult<RootDocument> {
        let mut entries = Vec::with_capacity(ROOT_KEYS.len());
        for key in ROOT_KEYS {
            entries.push((key.to_string(), self.kv.get(key).await?));
        }
        RootDocument::from_entries(entries)
    }

    async fn answer_results(&self) -> QbResult<Vec<V2AnswerRecord>> {
        self.kv.get_as(KEY_ANSWER_RESULTS).await
    }

    async fn review_plans(&self) -> QbResult<Vec<V2ReviewRecord>> {
        self.kv.get_as(KEY_REVIEW_PLANS).await
    }
}

fn entry<T: Serialize + ?Sized>(key: &str, value: &T) -> QbResult<(String, Value)> {
    Ok((key.to_string(), serde_json::to_value(value)?))
}
