use quiz_core::model::{OptionId, QuestionId, SessionSnapshot, UserAnswer};
use quiz_core::time::fixed_now;
use storage::repository::{SnapshotStore, Storage};
use storage::snapshot::{ANSWERS_KEY, SessionSnapshotRecord};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_key_value_round_trip() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Migrations are idempotent.
    repo.migrate().await.expect("migrate twice");

    assert_eq!(repo.get("started").await.unwrap(), None);

    repo.set("started", "true").await.unwrap();
    repo.set("started", "false").await.unwrap();
    assert_eq!(repo.get("started").await.unwrap().as_deref(), Some("false"));

    repo.remove("started").await.unwrap();
    repo.remove("started").await.unwrap();
    assert_eq!(repo.get("started").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_persists_snapshot_keys() {
    let storage = Storage::sqlite("sqlite:file:memdb_snapshot?mode=memory&cache=shared")
        .await
        .expect("open storage");
    let store = storage.snapshots.as_ref();

    let snapshot = SessionSnapshot {
        answers: vec![
            UserAnswer::new(QuestionId::new(1), Some(OptionId::new("a")), true, 12),
            UserAnswer::new(QuestionId::new(2), None, true, 40),
        ],
        current_index: 2,
        started: true,
        question_started_at: fixed_now(),
    };
    SessionSnapshotRecord::save(store, &snapshot).await.unwrap();

    let loaded = SessionSnapshotRecord::load(store).await.unwrap();
    assert_eq!(loaded, Some(snapshot));

    SessionSnapshotRecord::clear(store).await.unwrap();
    assert_eq!(store.get(ANSWERS_KEY).await.unwrap(), None);
    assert_eq!(SessionSnapshotRecord::load(store).await.unwrap(), None);
}
