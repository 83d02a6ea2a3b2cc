use storage::repository::{ItemStore, KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;
use study_core::model::{DatasetSelector, ItemRecord};
use std::sync::Arc;

#[tokio::test]
async fn sqlite_kv_set_get_overwrite_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_basic?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.set("k", "v1").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v1"));

    repo.set("k", "v2").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v2"));

    repo.remove("k").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap(), None);

    // removing twice is fine
    repo.remove("k").await.unwrap();
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn sqlite_item_store_keeps_datasets_apart() {
    let storage = Storage::sqlite("sqlite:file:memdb_item_store?mode=memory&cache=shared")
        .await
        .expect("storage");

    let general = vec![ItemRecord::new("Q1", "A1"), ItemRecord::new("Q2", "A2")];
    let weekly = vec![ItemRecord::new("W1", "B1")];
    storage
        .items
        .save_items(DatasetSelector::General, &general)
        .await
        .unwrap();
    storage
        .items
        .save_items(DatasetSelector::Weekly, &weekly)
        .await
        .unwrap();
    storage
        .items
        .save_selector(DatasetSelector::Weekly)
        .await
        .unwrap();

    // A second handle over the same backend sees the same data.
    let reopened = ItemStore::new(Arc::clone(&storage.kv));
    assert_eq!(
        reopened.load_items(DatasetSelector::General).await.unwrap(),
        general
    );
    assert_eq!(
        reopened.load_items(DatasetSelector::Weekly).await.unwrap(),
        weekly
    );
    assert_eq!(
        reopened.load_selector().await.unwrap(),
        Some(DatasetSelector::Weekly)
    );
}
