//! Integration tests for the record store: bootstrap, migration, backup and
//! due-list ordering.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use qbreview_core::{
    AnswerGrade, KeyValueStore, MemoryStore, QbError, RecordStore, V2Root,
};
use serde_json::json;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn legacy_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_entries([
        ("version", json!(1)),
        (
            "answerResults",
            json!([
                {"id": 0, "questionId": "113C01", "setId": "113C01", "answerDate": "2024-12-15", "result": 3},
                {"id": 1, "questionId": "114C02", "setId": "114C02", "answerDate": "2024-12-19", "result": 4}
            ]),
        ),
        ("answerResultsNextId", json!(2)),
        (
            "reviewPlans",
            json!([
                {"id": 0, "answerResultId": 0, "nextDate": "2024-12-18", "completed": true},
                {"id": 1, "answerResultId": 1, "nextDate": "2024-12-23", "completed": false}
            ]),
        ),
        ("reviewPlansNextId", json!(2)),
    ]))
}

#[tokio::test]
async fn test_validate_version_migrates_legacy_store() {
    let kv = legacy_store();
    let store = RecordStore::new(kv.clone());

    assert_eq!(store.validate_version().await.unwrap(), 2);

    assert_eq!(kv.get("version").await.unwrap(), json!(2));
    assert_eq!(
        kv.get("answerResults").await.unwrap(),
        json!([
            {"i": 0, "q": 0x113c01, "s": 0x113c01, "a": 20241215, "r": 3},
            {"i": 1, "q": 0x114c02, "s": 0x114c02, "a": 20241219, "r": 4}
        ])
    );
    assert_eq!(kv.get("answerResultsNextId").await.unwrap(), json!(2));
    assert_eq!(
        kv.get("reviewPlans").await.unwrap(),
        json!([
            {"i": 0, "a": 0, "n": 20241218, "c": 1},
            {"i": 1, "a": 1, "n": 20241223, "c": 0}
        ])
    );
    assert_eq!(kv.get("reviewPlansNextId").await.unwrap(), json!(2));

    let due = store.get_uncompleted_review_plans(d("2024-12-31")).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].answer_result.question_id, "114C02");
}

#[tokio::test]
async fn test_failed_migration_writes_nothing() {
    let kv = Arc::new(MemoryStore::with_entries([
        ("version", json!(1)),
        (
            "answerResults",
            json!([{"id": 0, "questionId": "zz", "setId": "1", "answerDate": "2024-12-15", "result": 3}]),
        ),
        ("answerResultsNextId", json!(1)),
        ("reviewPlans", json!([])),
        ("reviewPlansNextId", json!(0)),
    ]));
    let before = kv.snapshot().await;
    let store = RecordStore::new(kv.clone());

    let err = store.validate_version().await.unwrap_err();
    assert!(matches!(err, QbError::Parse { .. }));
    assert_eq!(kv.snapshot().await, before);
}

#[tokio::test]
async fn test_dump_load_round_trip() {
    let source = RecordStore::new(Arc::new(MemoryStore::new()));
    source.validate_version().await.unwrap();
    let a = source
        .upsert_answer_result(None, "114C01", "114C", d("2024-12-10"), AnswerGrade::Correct)
        .await
        .unwrap();
    source.upsert_review_plan(a, d("2024-12-13"), false).await.unwrap();

    let dump = source.dump().await.unwrap();
    assert_eq!(
        dump,
        r#"{"version":2,"answerResults":[{"i":0,"q":1133569,"s":4428,"a":20241210,"r":3}],"answerResultsNextId":1,"reviewPlans":[{"i":0,"a":0,"n":20241213,"c":0}],"reviewPlansNextId":1}"#
    );

    let target = RecordStore::new(Arc::new(MemoryStore::new()));
    target.load(&dump).await.unwrap();
    assert_eq!(target.dump().await.unwrap(), dump);
    assert_eq!(target.read_root().await.unwrap(), source.read_root().await.unwrap());

    // Loading into a populated store replaces everything.
    let other = RecordStore::new(Arc::new(MemoryStore::new()));
    other.validate_version().await.unwrap();
    other.load(&dump).await.unwrap();
    assert_eq!(other.dump().await.unwrap(), dump);
}

#[tokio::test]
async fn test_loaded_legacy_dump_is_migrated_by_validate_version() {
    let legacy = RecordStore::new(legacy_store());
    let dump = legacy.dump().await.unwrap();

    let target = RecordStore::new(Arc::new(MemoryStore::new()));
    target.load(&dump).await.unwrap();
    assert!(target.read_root().await.is_err());

    target.validate_version().await.unwrap();
    let root = target.read_root().await.unwrap();
    assert_eq!(root.answer_results.len(), 2);
    assert_eq!(root.version, 2);
}

#[tokio::test]
async fn test_bootstrap_root() {
    let store = RecordStore::new(Arc::new(MemoryStore::new()));
    store.validate_version().await.unwrap();
    assert_eq!(store.read_root().await.unwrap(), V2Root::default());
}

#[tokio::test]
async fn test_due_list_is_sorted_and_complete() {
    let store = RecordStore::new(Arc::new(MemoryStore::new()));
    store.validate_version().await.unwrap();

    let base = d("2024-12-01");
    // Offsets chosen to interleave, repeat and exceed the cutoff.
    let offsets = [9u64, 3, 17, 3, 0, 12, 25, 6, 9, 1];
    for (index, offset) in offsets.iter().enumerate() {
        let question = format!("{:X}", 0xA00 + index);
        let answer = store
            .upsert_answer_result(None, &question, "A", base, AnswerGrade::Correct)
            .await
            .unwrap();
        let completed = index % 4 == 3;
        store
            .upsert_review_plan(answer, base.checked_add_days(Days::new(*offset)).unwrap(), completed)
            .await
            .unwrap();
    }

    let until = d("2024-12-12");
    let due = store.get_uncompleted_review_plans(until).await.unwrap();

    assert!(due.windows(2).all(|w| w[0].plan.next_date <= w[1].plan.next_date));

    let root = store.read_root().await.unwrap();
    let mut expected: Vec<u64> = root
        .review_plans
        .iter()
        .filter(|p| !p.is_completed() && p.decode().unwrap().next_date <= until)
        .map(|p| p.i)
        .collect();
    let mut actual: Vec<u64> = due.iter().map(|p| p.plan.id).collect();
    expected.sort_unstable();
    actual.sort_unstable();
    assert_eq!(actual, expected);
    assert!(due.iter().all(|p| p.plan.answer_result_id == p.answer_result.id));
}

#[tokio::test]
async fn test_update_missing_answer_leaves_store_unmodified() {
    let kv = Arc::new(MemoryStore::new());
    let store = RecordStore::new(kv.clone());
    store.validate_version().await.unwrap();
    store
        .upsert_answer_result(None, "114C01", "114C", d("2024-12-10"), AnswerGrade::Wrong)
        .await
        .unwrap();
    let before = kv.snapshot().await;

    let err = store
        .upsert_answer_result(Some(42), "114C01", "114C", d("2024-12-11"), AnswerGrade::Easy)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(kv.snapshot().await, before);
}

#[tokio::test]
async fn test_listener_sees_committed_writes() {
    let kv = Arc::new(MemoryStore::new());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    kv.add_listener(
        "answerResultsNextId",
        Arc::new(move |value| {
            let _ = tx.send(value);
        }),
    )
    .unwrap();

    let store = RecordStore::new(kv);
    store.validate_version().await.unwrap();
    store
        .upsert_answer_result(None, "114C01", "114C", d("2024-12-10"), AnswerGrade::Wrong)
        .await
        .unwrap();

    assert_eq!(rx.recv().await.unwrap(), json!(0));
    assert_eq!(rx.recv().await.unwrap(), json!(1));
}
