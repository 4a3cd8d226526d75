//! End-to-end tests of the non-blocking operation family.

#![cfg(feature = "async")]

use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shelf_json_store::{Store, StoreConfig, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Task {
    title: String,
    done: bool,
}

#[tokio::test]
async fn full_lifecycle_in_multi_file_mode() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(StoreConfig::new(dir.path().join("tasks"))).unwrap();

    let task = Task {
        title: "ship it".to_string(),
        done: false,
    };
    let id = store.save_async(&task).await.unwrap();

    let loaded: Task = store.get_async(&id).await.unwrap();
    assert_eq!(loaded, task);

    let all = store.all_async().await.unwrap();
    assert_eq!(all.len(), 1);

    store.delete_async(&id).await.unwrap();
    assert!(store
        .get_async::<Task>(&id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn blocking_and_async_families_interoperate() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(StoreConfig::new(dir.path().join("tasks"))).unwrap();

    store.save_with_id("sync", &json!({"from": "sync"})).unwrap();
    store
        .save_with_id_async("async", &json!({"from": "async"}))
        .await
        .unwrap();

    let from_sync: Value = store.get_async("sync").await.unwrap();
    let from_async: Value = store.get("async").unwrap();

    assert_eq!(from_sync, json!({"from": "sync"}));
    assert_eq!(from_async, json!({"from": "async"}));
}

#[tokio::test]
async fn aggregate_round_trips_in_single_file_mode() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("db.json");
    let mut store = Store::open(StoreConfig::new(&file).pretty(true)).unwrap();

    store.save_with_id_async("d1", &json!({"x": 0.6})).await.unwrap();
    store.save_with_id_async("d2", &json!({"z": -3})).await.unwrap();

    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "{\n  \"d1\": {\n    \"x\": 0.6\n  },\n  \"d2\": {\n    \"z\": -3\n  }\n}"
    );

    store.delete_async("d1").await.unwrap();
    let all = store.all_async().await.unwrap();
    assert_eq!(all.keys().collect::<Vec<_>>(), vec!["d2"]);
}

#[tokio::test]
async fn all_async_fails_fast_on_an_unreadable_record() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("tasks");
    let mut store = Store::open(StoreConfig::new(&location)).unwrap();
    store
        .save_with_id_async("good", &json!(1))
        .await
        .unwrap();

    fs::write(location.join("bad.json"), b"{broken").unwrap();

    // A cold reader must fetch both; the unreadable one wins.
    let mut reader = Store::open(StoreConfig::new(&location)).unwrap();
    let err = reader.all_async().await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_async_of_unknown_id_fails_without_io() {
    let mut store = Store::open(StoreConfig::new("unused").memory()).unwrap();

    let err = store.delete_async("blabla").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn generated_ids_are_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(StoreConfig::new(dir.path().join("tasks"))).unwrap();

    let id1 = store.save_async(&json!({"j": 3})).await.unwrap();
    let id2 = store.save_async(&json!({"k": 4})).await.unwrap();

    assert_ne!(id1, id2);
    let all = store.all_async().await.unwrap();
    assert_eq!(all.len(), 2);
}
