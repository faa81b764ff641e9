use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use throttlekit_metadata_store::MetadataStore;
use tracing::debug;

use crate::broker::{BrokerId, BrokerMeta, BrokerMetaMap, BrokerMetrics};
use crate::errors::HandlerError;
use crate::handler::{ClusterHandler, MetaFetch};
use crate::overrides::{
    BrokerOverrides, BrokerThrottleOverride, Reassignments, ThrottleOverrideConfig,
};
use crate::partition_meta::PartitionMetaMap;
use crate::topic_state::{PartitionId, TopicState};

// Coordination store layout
pub const BASE_TOPICS_PATH: &str = "/brokers/topics";
pub const BASE_BROKER_IDS_PATH: &str = "/brokers/ids";
pub const BROKER_METRICS_PATH: &str = "/topicmappr/metrics/brokers";
pub const PARTITION_META_PATH: &str = "/topicmappr/metrics/partitions";
pub const BASE_OVERRIDES_PATH: &str = "/autothrottle/overrides/brokers";
pub const REASSIGN_PARTITIONS_PATH: &str = "/admin/reassign_partitions";

#[derive(Debug, Deserialize)]
struct ReassignmentRecord {
    #[serde(default)]
    partitions: Vec<PartitionReassignment>,
}

#[derive(Debug, Deserialize)]
struct PartitionReassignment {
    topic: String,
    partition: PartitionId,
    replicas: Vec<BrokerId>,
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn parse_broker_id(path: &str) -> Result<BrokerId, HandlerError> {
    last_segment(path)
        .parse()
        .map_err(|_| HandlerError::MalformedRecord {
            path: path.to_string(),
            reason: "broker id is not numeric".to_string(),
        })
}

/// [`ClusterHandler`] reading the coordination store layout from a `MetadataStore`.
#[derive(Debug, Clone)]
pub struct StoreHandler<S> {
    store: S,
}

impl<S: MetadataStore> StoreHandler<S> {
    pub fn new(store: S) -> Self {
        StoreHandler { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, HandlerError> {
        match self.store.get(path).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| HandlerError::Decode {
                    path: path.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    async fn registered_brokers(
        &self,
        diagnostics: &mut Vec<HandlerError>,
    ) -> Result<BrokerMetaMap, HandlerError> {
        let mut meta = BrokerMetaMap::new();

        for path in self.store.get_childrens(BASE_BROKER_IDS_PATH).await? {
            let id = match parse_broker_id(&path) {
                Ok(id) => id,
                Err(e) => {
                    diagnostics.push(e);
                    continue;
                }
            };

            match self.read::<BrokerMeta>(&path).await {
                Ok(Some(mut broker)) => {
                    // registration records never carry these
                    broker.metrics_incomplete = false;
                    broker.missing = false;
                    meta.insert(id, broker);
                }
                // deregistered between listing and read
                Ok(None) => debug!(broker_id = %id, "broker vanished during listing"),
                Err(e) => diagnostics.push(e),
            }
        }

        Ok(meta)
    }
}

#[async_trait]
impl<S: MetadataStore> ClusterHandler for StoreHandler<S> {
    async fn list_topics(&self, pattern: &Regex) -> Result<Vec<String>, HandlerError> {
        let mut topics: Vec<String> = self
            .store
            .get_childrens(BASE_TOPICS_PATH)
            .await?
            .iter()
            .map(|path| last_segment(path))
            .filter(|name| pattern.is_match(name))
            .map(str::to_string)
            .collect();
        topics.sort();
        Ok(topics)
    }

    async fn get_topic_state(&self, topic: &str) -> Result<TopicState, HandlerError> {
        let path = format!("{}/{}", BASE_TOPICS_PATH, topic);
        let state: TopicState = self
            .read(&path)
            .await?
            .ok_or_else(|| HandlerError::NotFound(path.clone()))?;
        state.validate(&path)?;
        Ok(state)
    }

    async fn get_all_broker_meta(&self, include_metrics: bool) -> MetaFetch<BrokerMetaMap> {
        let mut diagnostics = Vec::new();

        let mut meta = match self.registered_brokers(&mut diagnostics).await {
            Ok(meta) => meta,
            Err(e) => {
                diagnostics.push(e);
                return MetaFetch::Unavailable(diagnostics);
            }
        };

        if meta.is_empty() {
            diagnostics.push(HandlerError::NoBrokersRegistered);
            return MetaFetch::Unavailable(diagnostics);
        }

        if include_metrics {
            let metrics = match self
                .read::<BTreeMap<BrokerId, BrokerMetrics>>(BROKER_METRICS_PATH)
                .await
            {
                Ok(Some(metrics)) => metrics,
                Ok(None) => {
                    diagnostics.push(HandlerError::NotFound(BROKER_METRICS_PATH.to_string()));
                    return MetaFetch::Unavailable(diagnostics);
                }
                Err(e) => {
                    diagnostics.push(e);
                    return MetaFetch::Unavailable(diagnostics);
                }
            };

            for (id, broker) in meta.iter_mut() {
                match metrics.get(id) {
                    Some(m) => broker.storage_free = m.storage_free,
                    None => {
                        broker.metrics_incomplete = true;
                        diagnostics.push(HandlerError::MetricsNotFound(*id));
                    }
                }
            }

            for (id, m) in metrics {
                if !meta.contains_key(&id) {
                    meta.insert(
                        id,
                        BrokerMeta {
                            storage_free: m.storage_free,
                            missing: true,
                            ..Default::default()
                        },
                    );
                    diagnostics.push(HandlerError::UnregisteredBroker(id));
                }
            }
        }

        MetaFetch::from_parts(Some(meta), diagnostics)
    }

    async fn get_all_partition_meta(&self) -> Result<PartitionMetaMap, HandlerError> {
        self.read(PARTITION_META_PATH)
            .await?
            .ok_or_else(|| HandlerError::NotFound(PARTITION_META_PATH.to_string()))
    }

    async fn get_broker_overrides(&self) -> Result<BrokerOverrides, HandlerError> {
        let prefix = format!("{}/", BASE_OVERRIDES_PATH);
        let mut overrides = BrokerOverrides::new();

        for entry in self.store.get_bulk(&prefix).await? {
            let id = parse_broker_id(&entry.key)?;
            let config: ThrottleOverrideConfig =
                serde_json::from_value(entry.value).map_err(|source| HandlerError::Decode {
                    path: entry.key.clone(),
                    source,
                })?;
            overrides.insert(BrokerThrottleOverride::new(id, config));
        }

        Ok(overrides)
    }

    async fn get_reassignments(&self) -> Result<Reassignments, HandlerError> {
        let mut reassignments = Reassignments::new();

        if let Some(record) = self
            .read::<ReassignmentRecord>(REASSIGN_PARTITIONS_PATH)
            .await?
        {
            for p in record.partitions {
                reassignments.insert(p.topic, p.partition, p.replicas);
            }
        }

        Ok(reassignments)
    }
}
