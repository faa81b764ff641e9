use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use throttlekit_core::{BrokerId, PartitionId};

/// Role of a replica within its partition. The first replica listed is the leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicaRole {
    Leader,
    Follower,
}

impl ReplicaRole {
    pub fn for_position(position: usize) -> Self {
        if position == 0 {
            ReplicaRole::Leader
        } else {
            ReplicaRole::Follower
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicaRole::Leader => "leader",
            ReplicaRole::Follower => "follower",
        }
    }

    /// Topic level dynamic config that lists the throttled replicas of this role.
    pub fn config_name(&self) -> &'static str {
        match self {
            ReplicaRole::Leader => "leader.replication.throttled.replicas",
            ReplicaRole::Follower => "follower.replication.throttled.replicas",
        }
    }
}

impl fmt::Display for ReplicaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One throttled replica, rendered as `"<partition>:<brokerID>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplicaDescriptor {
    pub partition: PartitionId,
    pub broker: BrokerId,
}

impl fmt::Display for ReplicaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.partition, self.broker)
    }
}

impl Serialize for ReplicaDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Replica role -> throttled replicas, in insertion order.
pub type Throttled = BTreeMap<ReplicaRole, Vec<ReplicaDescriptor>>;

/// One topic config value ready for the writer, e.g.
/// `("orders", Leader, "1:2,4:2")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub topic: String,
    pub role: ReplicaRole,
    pub replicas: String,
}

impl ConfigEntry {
    pub fn config_name(&self) -> &'static str {
        self.role.config_name()
    }
}

/// Topic -> role -> throttled replicas.
///
/// A topic is present only once a replica was added for it, so absence means no
/// throttle is needed for that topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThrottledReplicaIndex(BTreeMap<String, Throttled>);

impl ThrottledReplicaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `partition:broker` under `topic`/`role` unless already present.
    pub fn add_replica(
        &mut self,
        topic: &str,
        partition: PartitionId,
        role: ReplicaRole,
        broker: BrokerId,
    ) {
        let replicas = self
            .0
            .entry(topic.to_string())
            .or_default()
            .entry(role)
            .or_default();

        let descriptor = ReplicaDescriptor { partition, broker };
        if replicas.contains(&descriptor) {
            return;
        }
        replicas.push(descriptor);
    }

    pub fn get(&self, topic: &str) -> Option<&Throttled> {
        self.0.get(topic)
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.0.contains_key(topic)
    }

    /// Throttled replicas of `topic` for `role`, empty when there are none.
    pub fn replicas(&self, topic: &str, role: ReplicaRole) -> &[ReplicaDescriptor] {
        self.0
            .get(topic)
            .and_then(|throttled| throttled.get(&role))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Throttled)> {
        self.0.iter().map(|(topic, throttled)| (topic.as_str(), throttled))
    }

    /// Number of topics with at least one throttled replica.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of descriptors across topics and roles.
    pub fn replica_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|throttled| throttled.values())
            .map(Vec::len)
            .sum()
    }

    pub fn config_entries(&self) -> Vec<ConfigEntry> {
        self.iter()
            .flat_map(|(topic, throttled)| {
                throttled.iter().map(move |(role, replicas)| ConfigEntry {
                    topic: topic.to_string(),
                    role: *role,
                    replicas: replicas
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_replica_is_idempotent() {
        let mut index = ThrottledReplicaIndex::new();
        index.add_replica("orders", 0, ReplicaRole::Follower, BrokerId(2));
        let once = index.clone();

        index.add_replica("orders", 0, ReplicaRole::Follower, BrokerId(2));
        assert_eq!(index, once);
        assert_eq!(index.replica_count(), 1);
    }

    #[test]
    fn dedup_is_per_topic_and_role() {
        let mut index = ThrottledReplicaIndex::new();
        let calls = [
            ("orders", 0, ReplicaRole::Follower, 2),
            ("orders", 1, ReplicaRole::Leader, 2),
            ("orders", 0, ReplicaRole::Follower, 2),
            ("orders", 0, ReplicaRole::Leader, 2),
            ("payments", 0, ReplicaRole::Follower, 2),
            ("orders", 1, ReplicaRole::Leader, 2),
        ];
        for (topic, partition, role, broker) in calls {
            index.add_replica(topic, partition, role, BrokerId(broker));
        }

        let rendered = |topic, role| -> Vec<String> {
            index
                .replicas(topic, role)
                .iter()
                .map(ToString::to_string)
                .collect()
        };
        assert_eq!(rendered("orders", ReplicaRole::Leader), vec!["1:2", "0:2"]);
        assert_eq!(rendered("orders", ReplicaRole::Follower), vec!["0:2"]);
        assert_eq!(rendered("payments", ReplicaRole::Follower), vec!["0:2"]);
        assert!(rendered("payments", ReplicaRole::Leader).is_empty());
    }

    #[test]
    fn serializes_descriptor_strings() {
        let mut index = ThrottledReplicaIndex::new();
        index.add_replica("orders", 1, ReplicaRole::Leader, BrokerId(2));
        index.add_replica("orders", 0, ReplicaRole::Follower, BrokerId(2));

        assert_eq!(
            serde_json::to_value(&index).unwrap(),
            json!({"orders": {"leader": ["1:2"], "follower": ["0:2"]}})
        );
    }

    #[test]
    fn config_entries_join_descriptors() {
        let mut index = ThrottledReplicaIndex::new();
        index.add_replica("orders", 0, ReplicaRole::Follower, BrokerId(2));
        index.add_replica("orders", 3, ReplicaRole::Follower, BrokerId(5));
        index.add_replica("orders", 1, ReplicaRole::Leader, BrokerId(2));

        let entries = index.config_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, ReplicaRole::Leader);
        assert_eq!(entries[0].replicas, "1:2");
        assert_eq!(entries[1].config_name(), "follower.replication.throttled.replicas");
        assert_eq!(entries[1].replicas, "0:2,3:5");
    }
}
