use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::topic_state::PartitionId;

/// Size data for one partition as written by the metrics collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionMeta {
    #[serde(rename = "Size")]
    pub size: f64,
}

/// Topic -> partition -> size metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionMetaMap(BTreeMap<String, BTreeMap<PartitionId, PartitionMeta>>);

impl PartitionMetaMap {
    pub fn get(&self, topic: &str, partition: PartitionId) -> Option<&PartitionMeta> {
        self.0.get(topic).and_then(|partitions| partitions.get(&partition))
    }

    /// Size of a partition; `None` means no size data was collected for it.
    pub fn size(&self, topic: &str, partition: PartitionId) -> Option<f64> {
        self.get(topic, partition).map(|meta| meta.size)
    }

    pub fn insert(
        &mut self,
        topic: impl Into<String>,
        partition: PartitionId,
        meta: PartitionMeta,
    ) {
        self.0.entry(topic.into()).or_default().insert(partition, meta);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PartitionId, &PartitionMeta)> {
        self.0.iter().flat_map(|(topic, partitions)| {
            partitions
                .iter()
                .map(move |(partition, meta)| (topic.as_str(), *partition, meta))
        })
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_collector_layout() {
        let map: PartitionMetaMap = serde_json::from_value(json!({
            "orders": {"0": {"Size": 1024.0}, "1": {"Size": 2048.0}},
            "payments": {"3": {"Size": 10.5}}
        }))
        .unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.size("orders", 1), Some(2048.0));
        assert_eq!(map.size("payments", 3), Some(10.5));
        assert_eq!(map.size("payments", 0), None);
        assert_eq!(map.size("unknown", 0), None);
    }
}
