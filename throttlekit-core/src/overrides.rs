use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::broker::BrokerId;
use crate::topic_state::{PartitionId, TopicStates};

/// Static throttle override as configured by an operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThrottleOverrideConfig {
    /// Replication rate in MB/s, `0` means no override.
    #[serde(default)]
    pub rate: u64,
    /// Remove the override once no reassignment is in flight. Not acted on here,
    /// carried through for the component that manages the override nodes.
    #[serde(default)]
    pub autoremove: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerThrottleOverride {
    pub id: BrokerId,
    /// The broker takes part in an in-flight reassignment, its throttle is owned by
    /// the reassignment mechanism.
    pub reassignment_participant: bool,
    pub config: ThrottleOverrideConfig,
}

impl BrokerThrottleOverride {
    pub fn new(id: BrokerId, config: ThrottleOverrideConfig) -> Self {
        BrokerThrottleOverride {
            id,
            reassignment_participant: false,
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.rate > 0
    }
}

/// Broker override registry, keyed by broker ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrokerOverrides(BTreeMap<BrokerId, BrokerThrottleOverride>);

impl BrokerOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: BrokerThrottleOverride) {
        self.0.insert(entry.id, entry);
    }

    pub fn get(&self, id: BrokerId) -> Option<&BrokerThrottleOverride> {
        self.0.get(&id)
    }

    pub fn contains(&self, id: BrokerId) -> bool {
        self.0.contains_key(&id)
    }

    /// Returns the overrides for which `keep` holds.
    pub fn filter<F>(&self, keep: F) -> BrokerOverrides
    where
        F: Fn(&BrokerThrottleOverride) -> bool,
    {
        BrokerOverrides(
            self.0
                .iter()
                .filter(|(_, o)| keep(o))
                .map(|(id, o)| (*id, o.clone()))
                .collect(),
        )
    }

    pub fn ids(&self) -> BTreeSet<BrokerId> {
        self.0.keys().copied().collect()
    }

    /// Flags every override whose broker is in `participants`, clears the rest.
    pub fn mark_reassignment_participants(&mut self, participants: &BTreeSet<BrokerId>) {
        for (id, entry) in self.0.iter_mut() {
            entry.reassignment_participant = participants.contains(id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BrokerThrottleOverride> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<BrokerThrottleOverride> for BrokerOverrides {
    fn from_iter<I: IntoIterator<Item = BrokerThrottleOverride>>(iter: I) -> Self {
        BrokerOverrides(iter.into_iter().map(|o| (o.id, o)).collect())
    }
}

/// In-flight partition reassignments: topic -> partition -> target replica list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reassignments(BTreeMap<String, BTreeMap<PartitionId, Vec<BrokerId>>>);

impl Reassignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        topic: impl Into<String>,
        partition: PartitionId,
        targets: Vec<BrokerId>,
    ) {
        self.0.entry(topic.into()).or_default().insert(partition, targets);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Brokers moving data: every target replica plus the current replicas of each
    /// reassigning partition.
    pub fn participants(&self, states: &TopicStates) -> BTreeSet<BrokerId> {
        let mut brokers = BTreeSet::new();
        for (topic, partitions) in &self.0 {
            for (partition, targets) in partitions {
                brokers.extend(targets.iter().copied());
                if let Some(current) = states
                    .get(topic)
                    .and_then(|state| state.partitions.get(partition))
                {
                    brokers.extend(current.iter().copied());
                }
            }
        }
        brokers
    }
}
