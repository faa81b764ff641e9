#![allow(dead_code)]

use serde_json::{json, Value};
use throttlekit_core::{
    StoreHandler, BASE_BROKER_IDS_PATH, BASE_OVERRIDES_PATH, BASE_TOPICS_PATH,
    BROKER_METRICS_PATH, PARTITION_META_PATH, REASSIGN_PARTITIONS_PATH,
};
use throttlekit_metadata_store::{MemoryStore, MetadataStore};

/// Builds a coordination store populated with the given cluster state.
#[derive(Default)]
pub struct ClusterFixture {
    entries: Vec<(String, Value)>,
}

impl ClusterFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(mut self, name: &str, partitions: Value) -> Self {
        self.entries.push((
            format!("{}/{}", BASE_TOPICS_PATH, name),
            json!({"version": 1, "partitions": partitions}),
        ));
        self
    }

    pub fn broker(mut self, id: u32) -> Self {
        self.entries.push((
            format!("{}/{}", BASE_BROKER_IDS_PATH, id),
            json!({
                "host": format!("kafka-{}", id),
                "port": 9092,
                "rack": "a",
                "endpoints": [format!("PLAINTEXT://kafka-{}:9092", id)],
                "version": 4
            }),
        ));
        self
    }

    pub fn broker_metrics(mut self, metrics: Value) -> Self {
        self.entries.push((BROKER_METRICS_PATH.to_string(), metrics));
        self
    }

    pub fn partition_meta(mut self, meta: Value) -> Self {
        self.entries.push((PARTITION_META_PATH.to_string(), meta));
        self
    }

    pub fn override_rate(mut self, id: u32, rate: u64) -> Self {
        self.entries.push((
            format!("{}/{}", BASE_OVERRIDES_PATH, id),
            json!({"rate": rate, "autoremove": false}),
        ));
        self
    }

    pub fn reassignment(mut self, partitions: Value) -> Self {
        self.entries.push((
            REASSIGN_PARTITIONS_PATH.to_string(),
            json!({"version": 1, "partitions": partitions}),
        ));
        self
    }

    pub fn raw(mut self, path: &str, value: Value) -> Self {
        self.entries.push((path.to_string(), value));
        self
    }

    pub async fn build(self) -> StoreHandler<MemoryStore> {
        let store = MemoryStore::new();
        for (path, value) in self.entries {
            store.put(&path, value).await.expect("fixture put");
        }
        StoreHandler::new(store)
    }
}
