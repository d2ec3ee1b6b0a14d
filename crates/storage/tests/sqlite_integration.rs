use chrono::Duration;
use quiz_core::model::{Difficulty, Question, QuestionId, Rating, ResultDetail, ResultRecord, TopicId};
use quiz_core::time::fixed_now;
use storage::repository::KeyValueStore;
use storage::sqlite::SqliteStore;
use storage::{Storage, StorageKey};

fn record() -> ResultRecord {
    let question = Question::new(
        QuestionId::new("q1").unwrap(),
        "A shirt bought for $200$ sells for $250$. Profit %?",
        vec!["20%".into(), "25%".into(), "50%".into()],
        1,
        Difficulty::Medium,
        "$\\frac{50}{200} = 25\\%$",
    )
    .unwrap();
    ResultRecord::from_details(
        TopicId::new("profit-loss").unwrap(),
        Rating::new(3).unwrap(),
        vec![ResultDetail {
            question,
            selected: Some(1),
        }],
        fixed_now(),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_kv_set_get_delete() {
    let store = SqliteStore::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");
    // Migrations are idempotent.
    store.migrate().await.expect("migrate twice");

    assert_eq!(store.get(StorageKey::Authenticated).await.unwrap(), None);
    store.set(StorageKey::Authenticated, "true").await.unwrap();
    store.set(StorageKey::Authenticated, "false").await.unwrap();
    assert_eq!(
        store.get(StorageKey::Authenticated).await.unwrap().as_deref(),
        Some("false")
    );

    store.delete(StorageKey::Authenticated).await.unwrap();
    assert_eq!(store.get(StorageKey::Authenticated).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_session_store_keeps_results_until_expiry() {
    let storage = Storage::sqlite("sqlite:file:memdb_results?mode=memory&cache=shared")
        .await
        .expect("open");
    let store = storage.session_store();
    store.save_results(&record()).await.unwrap();

    let ttl = Duration::hours(24);
    let loaded = store
        .load_results(fixed_now() + Duration::hours(1), ttl)
        .await
        .unwrap()
        .expect("fresh results");
    assert_eq!(loaded.score(), 1);
    assert_eq!(loaded.total(), 1);

    assert!(
        store
            .load_results(fixed_now() + Duration::hours(25), ttl)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(storage.kv.get(StorageKey::LastResults).await.unwrap(), None);
}
