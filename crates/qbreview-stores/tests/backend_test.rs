//! Conformance tests: the record store and workflow behave the same on every
//! persistent backend, and state survives reopening.

use std::sync::Arc;

use chrono::NaiveDate;
use qbreview_core::config::{StorageBackend, StorageConfig};
use qbreview_core::{
    upsert_answer_result_and_review_plan, AnswerGrade, KeyValueStore, QbError, RecordStore,
};
use qbreview_stores::{JsonFileStore, SqliteStore, StoreFactory};
use serde_json::json;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn exercise(kv: Arc<dyn KeyValueStore>) {
    let store = RecordStore::new(kv.clone());
    assert_eq!(store.validate_version().await.unwrap(), 2);

    let first = upsert_answer_result_and_review_plan(
        &store,
        "114C02",
        "114C02",
        d("2024-12-10"),
        AnswerGrade::Difficult,
    )
    .await
    .unwrap();
    let second = upsert_answer_result_and_review_plan(
        &store,
        "114C02",
        "114C02",
        d("2024-12-12"),
        AnswerGrade::Easy,
    )
    .await
    .unwrap();
    assert_eq!((first, second), (0, 1));

    let due = store.get_uncompleted_review_plans(d("2024-12-31")).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].plan.answer_result_id, second);
    // gap 2 days, answered on the due date, Easy doubles the gap
    assert_eq!(due[0].plan.next_date, d("2024-12-16"));

    let err = store
        .upsert_review_plan(99, d("2024-12-20"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, QbError::NotFound { .. }));
    assert_eq!(kv.get("reviewPlansNextId").await.unwrap(), json!(2));
}

#[tokio::test]
async fn test_sqlite_backend() {
    exercise(Arc::new(SqliteStore::in_memory().unwrap())).await;
}

#[tokio::test]
async fn test_json_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("store.json")).await.unwrap();
    exercise(Arc::new(store)).await;
}

#[tokio::test]
async fn test_sqlite_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("store.db");

    let dump = {
        let store = RecordStore::new(Arc::new(SqliteStore::new(&path).unwrap()));
        store.validate_version().await.unwrap();
        upsert_answer_result_and_review_plan(&store, "A1", "A", d("2024-12-01"), AnswerGrade::Correct)
            .await
            .unwrap();
        store.dump().await.unwrap()
    };

    let reopened = RecordStore::new(Arc::new(SqliteStore::new(&path).unwrap()));
    assert_eq!(reopened.validate_version().await.unwrap(), 2);
    assert_eq!(reopened.dump().await.unwrap(), dump);
}

#[tokio::test]
async fn test_factory_backends_share_semantics() {
    let dir = tempfile::tempdir().unwrap();
    for (backend, file) in [
        (StorageBackend::Sqlite, "store.db"),
        (StorageBackend::JsonFile, "store.json"),
        (StorageBackend::Memory, "unused"),
    ] {
        let config = StorageConfig {
            backend,
            path: Some(dir.path().join(file)),
        };
        let kv = StoreFactory::create(&config).await.unwrap();
        exercise(kv).await;
    }
}

#[tokio::test]
async fn test_migration_on_sqlite() {
    let kv = Arc::new(SqliteStore::in_memory().unwrap());
    kv.set_many(vec![
        ("version".to_string(), json!(1)),
        (
            "answerResults".to_string(),
            json!([{"id": 0, "questionId": "113C01", "setId": "113C01", "answerDate": "2024-12-15", "result": 3}]),
        ),
        ("answerResultsNextId".to_string(), json!(1)),
        (
            "reviewPlans".to_string(),
            json!([{"id": 0, "answerResultId": 0, "nextDate": "2024-12-18", "completed": false}]),
        ),
        ("reviewPlansNextId".to_string(), json!(1)),
    ])
    .await
    .unwrap();

    let store = RecordStore::new(kv);
    assert_eq!(store.validate_version().await.unwrap(), 2);

    let due = store.get_uncompleted_review_plans(d("2024-12-18")).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].answer_result.question_id, "113C01");
    assert_eq!(due[0].answer_result.answer_date, d("2024-12-15"));
}
