use kanban_domain::{BoardSnapshot, EndOutcome};
use kanban_engine::{BoardEngine, CommitOutcome, EngineConfig};
use kanban_persistence::{BoardStore, JsonFileStore};
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn confirmed_moves_survive_a_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    let store = JsonFileStore::new(&path);
    store
        .create("Release", &["Todo".to_string(), "Doing".to_string()])
        .await
        .unwrap();
    let first = store.append_task("Todo", "write docs").await.unwrap().id;
    let second = store.append_task("Todo", "cut tag").await.unwrap().id;
    let doing = store.load().await.unwrap().columns[1].id;

    let store = Arc::new(store);
    let (mut engine, _rx) = BoardEngine::load(store.clone(), EngineConfig::default())
        .await
        .unwrap();

    let session = engine.start(second).unwrap();
    engine.update(session, doing);
    assert!(matches!(engine.end(session, Some(doing)), EndOutcome::Commit(_)));
    assert!(matches!(
        engine.settle().await,
        CommitOutcome::Confirmed { .. }
    ));

    let reloaded = JsonFileStore::new(&path).load().await.unwrap();
    let snapshot = BoardSnapshot::from_load(&reloaded.columns, &reloaded.tasks).unwrap();
    assert_eq!(&snapshot, engine.snapshot());
    assert_eq!(reloaded.task(first).unwrap().position, 0);
    assert_eq!(reloaded.task(second).unwrap().column_id, doing);
}

#[tokio::test]
async fn backend_rejection_keeps_file_and_engine_in_step() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    let store = JsonFileStore::new(&path);
    store.create("Ops", &["Todo".to_string()]).await.unwrap();
    let a = store.append_task("Todo", "a").await.unwrap().id;
    let b = store.append_task("Todo", "b").await.unwrap().id;

    let store = Arc::new(store);
    let (mut engine, _rx) = BoardEngine::load(store.clone(), EngineConfig::default())
        .await
        .unwrap();
    let before = engine.snapshot().clone();

    // Another writer adds a task behind the engine's back, so the engine's
    // full-order command no longer covers the column.
    store.append_task("Todo", "c").await.unwrap();

    let session = engine.start(a).unwrap();
    engine.end(session, Some(b));
    assert!(matches!(
        engine.settle().await,
        CommitOutcome::Failed { .. }
    ));
    assert_eq!(engine.snapshot(), &before);

    let on_disk = store.load().await.unwrap();
    assert_eq!(on_disk.task(a).unwrap().position, 0);
    assert_eq!(on_disk.task(b).unwrap().position, 1);
}
