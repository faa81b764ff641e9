#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use throttlekit_autothrottle::{ThrottleWriter, ThrottledReplicaIndex};
use throttlekit_core::{
    BASE_OVERRIDES_PATH, BASE_TOPICS_PATH, REASSIGN_PARTITIONS_PATH,
};
use throttlekit_metadata_store::{MemoryStore, MetadataStore};

pub async fn put_topic(store: &MemoryStore, name: &str, partitions: Value) {
    store
        .put(
            &format!("{}/{}", BASE_TOPICS_PATH, name),
            json!({"version": 1, "partitions": partitions}),
        )
        .await
        .expect("put topic");
}

pub async fn put_override(store: &MemoryStore, id: u32, rate: u64) {
    store
        .put(
            &format!("{}/{}", BASE_OVERRIDES_PATH, id),
            json!({"rate": rate, "autoremove": false}),
        )
        .await
        .expect("put override");
}

pub async fn put_reassignment(store: &MemoryStore, partitions: Value) {
    store
        .put(
            REASSIGN_PARTITIONS_PATH,
            json!({"version": 1, "partitions": partitions}),
        )
        .await
        .expect("put reassignment");
}

/// Writer keeping every index it was handed.
#[derive(Clone, Default)]
pub struct RecordingWriter {
    applied: Arc<Mutex<Vec<ThrottledReplicaIndex>>>,
}

impl RecordingWriter {
    pub fn applied(&self) -> Vec<ThrottledReplicaIndex> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl ThrottleWriter for RecordingWriter {
    async fn apply(&self, index: &ThrottledReplicaIndex) -> Result<()> {
        self.applied.lock().unwrap().push(index.clone());
        Ok(())
    }
}
