//! # MemoryStore behaviour
//!
//! Exercises the `MetadataStore` operations the cluster handler relies on:
//! point reads, child listing, bulk reads and change notifications used by the
//! autothrottle control loop to wake up early.

use futures::StreamExt;
use serde_json::json;
use std::time::Duration;
use throttlekit_metadata_store::{MemoryStore, MetadataStore, WatchEvent};

#[tokio::test]
async fn put_get_delete() {
    let store = MemoryStore::new();

    assert!(store.get("/brokers/topics/orders").await.unwrap().is_none());

    store
        .put("/brokers/topics/orders", json!({"partitions": {"0": [1, 2]}}))
        .await
        .unwrap();
    assert_eq!(
        store.get("/brokers/topics/orders").await.unwrap(),
        Some(json!({"partitions": {"0": [1, 2]}}))
    );

    store.delete("/brokers/topics/orders").await.unwrap();
    assert!(store.get("/brokers/topics/orders").await.unwrap().is_none());

    // deleting a missing node is not an error
    store.delete("/brokers/topics/orders").await.unwrap();
}

#[tokio::test]
async fn put_requires_key_component() {
    let store = MemoryStore::new();
    assert!(store.put("/brokers", json!(null)).await.is_err());
}

#[tokio::test]
async fn bulk_reads_by_prefix() {
    let store = MemoryStore::new();
    store
        .put("/autothrottle/overrides/brokers/1", json!({"rate": 10}))
        .await
        .unwrap();
    store
        .put("/autothrottle/overrides/brokers/2", json!({"rate": 20}))
        .await
        .unwrap();
    store
        .put("/autothrottle/other/value", json!(true))
        .await
        .unwrap();

    let entries = store
        .get_bulk("/autothrottle/overrides/brokers/")
        .await
        .unwrap();

    let keys: Vec<&str> = entries.iter().map(|kv| kv.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "/autothrottle/overrides/brokers/1",
            "/autothrottle/overrides/brokers/2"
        ]
    );
    assert_eq!(entries[1].value, json!({"rate": 20}));
}

#[tokio::test]
async fn watch_sees_changes_under_prefix() {
    let store = MemoryStore::new();
    let mut stream = store.watch("/brokers/topics").await.unwrap();

    store.put("/brokers/ids/1", json!({})).await.unwrap();
    store
        .put("/brokers/topics/orders", json!({"partitions": {}}))
        .await
        .unwrap();

    let event = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("watch event")
        .expect("stream open")
        .unwrap();

    assert_eq!(event.key(), "/brokers/topics/orders");
    assert!(matches!(event, WatchEvent::Put { .. }));
}

#[tokio::test]
async fn snapshot_reload_only_notifies_changes() {
    let store = MemoryStore::new();
    let snapshot = json!({
        "/brokers/topics/orders": {"partitions": {"0": [1]}},
        "/brokers/ids/1": {"host": "kafka-1"}
    });
    store.load_snapshot(&snapshot).unwrap();

    let mut stream = store.watch("/brokers").await.unwrap();

    // identical content produces no events
    store.load_snapshot(&snapshot).unwrap();

    store
        .load_snapshot(&json!({
            "/brokers/topics/orders": {"partitions": {"0": [2]}}
        }))
        .unwrap();

    let mut keys = Vec::new();
    for _ in 0..2 {
        let event = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("watch event")
            .expect("stream open")
            .unwrap();
        keys.push(event.to_string());
    }
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "Delete(key: /brokers/ids/1)",
            "Put(key: /brokers/topics/orders)"
        ]
    );

    let quiet = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
    assert!(quiet.is_err());
}
