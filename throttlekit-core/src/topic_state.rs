use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::broker::BrokerId;
use crate::errors::HandlerError;

pub type PartitionId = u32;

/// Replica assignment of one topic: partition -> ordered broker list, leader first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicState {
    pub partitions: BTreeMap<PartitionId, Vec<BrokerId>>,
}

impl TopicState {
    /// Checks that every partition has a leader and no broker twice in its replica list.
    pub fn validate(&self, path: &str) -> Result<(), HandlerError> {
        for (partition, replicas) in &self.partitions {
            if replicas.is_empty() {
                return Err(HandlerError::MalformedRecord {
                    path: path.to_string(),
                    reason: format!("partition {} has no replicas", partition),
                });
            }

            let mut seen = BTreeSet::new();
            if let Some(dup) = replicas.iter().find(|id| !seen.insert(**id)) {
                return Err(HandlerError::MalformedRecord {
                    path: path.to_string(),
                    reason: format!("partition {} lists broker {} twice", partition, dup),
                });
            }
        }
        Ok(())
    }

    pub fn leader(&self, partition: PartitionId) -> Option<BrokerId> {
        self.partitions
            .get(&partition)
            .and_then(|replicas| replicas.first().copied())
    }

    /// Whether any partition has a replica on one of `brokers`.
    pub fn assigned_to_any(&self, brokers: &BTreeSet<BrokerId>) -> bool {
        self.partitions
            .values()
            .flatten()
            .any(|id| brokers.contains(id))
    }
}

/// TopicState for every fetched topic, keyed by topic name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicStates(BTreeMap<String, TopicState>);

impl TopicStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, topic: impl Into<String>, state: TopicState) {
        self.0.insert(topic.into(), state);
    }

    pub fn get(&self, topic: &str) -> Option<&TopicState> {
        self.0.get(topic)
    }

    /// Keeps the topics whose state satisfies `keep`.
    pub fn filter<F>(&self, keep: F) -> TopicStates
    where
        F: Fn(&TopicState) -> bool,
    {
        TopicStates(
            self.0
                .iter()
                .filter(|(_, state)| keep(state))
                .map(|(name, state)| (name.clone(), state.clone()))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TopicState)> {
        self.0.iter().map(|(name, state)| (name.as_str(), state))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, TopicState)> for TopicStates {
    fn from_iter<I: IntoIterator<Item = (String, TopicState)>>(iter: I) -> Self {
        TopicStates(iter.into_iter().collect())
    }
}
