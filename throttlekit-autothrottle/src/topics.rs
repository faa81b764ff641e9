use futures::stream::{self, StreamExt, TryStreamExt};
use regex::Regex;
use std::collections::BTreeSet;
use throttlekit_core::{
    BrokerId, BrokerOverrides, ClusterHandler, HandlerError, Reassignments, TopicState,
    TopicStates,
};
use tracing::debug;

use crate::throttled::{ReplicaRole, ThrottledReplicaIndex};

/// Fetches the state of every topic matching `pattern`, at most `concurrency`
/// requests in flight. The first failed fetch aborts the whole call.
pub async fn get_all_topic_states<H>(
    handler: &H,
    pattern: &Regex,
    concurrency: usize,
) -> Result<TopicStates, HandlerError>
where
    H: ClusterHandler + ?Sized,
{
    let topics = handler.list_topics(pattern).await?;

    let fetched: Vec<(String, TopicState)> = stream::iter(topics)
        .map(|topic| async move {
            let state = handler.get_topic_state(&topic).await?;
            Ok::<_, HandlerError>((topic, state))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(fetched.into_iter().collect())
}

/// Indexes every replica placed on a broker with a configured override that is not
/// part of an in-flight reassignment.
pub fn throttle_targets(
    states: &TopicStates,
    overrides: &BrokerOverrides,
) -> ThrottledReplicaIndex {
    let throttled = overrides
        .filter(|o| o.is_configured() && !o.reassignment_participant)
        .ids();

    let mut index = ThrottledReplicaIndex::new();
    if throttled.is_empty() {
        return index;
    }

    for (topic, state) in states.iter() {
        for (partition, replicas) in &state.partitions {
            for (position, id) in replicas.iter().enumerate() {
                if throttled.contains(id) {
                    index.add_replica(topic, *partition, ReplicaRole::for_position(position), *id);
                }
            }
        }
    }

    index
}

/// Fetches the selected topology and computes the throttle targets for `overrides`.
///
/// Either the complete index is returned or the fetch error, never a partial index.
pub async fn compute_throttle_targets<H>(
    handler: &H,
    pattern: &Regex,
    overrides: &BrokerOverrides,
    concurrency: usize,
) -> Result<ThrottledReplicaIndex, HandlerError>
where
    H: ClusterHandler + ?Sized,
{
    let states = get_all_topic_states(handler, pattern, concurrency).await?;
    let index = throttle_targets(&states, overrides);

    debug!(
        topics = states.len(),
        throttled_topics = index.len(),
        throttled_replicas = index.replica_count(),
        "computed throttle targets"
    );

    Ok(index)
}

/// Overrides configured in the store, reassignment participants flagged.
pub async fn load_broker_overrides<H>(handler: &H) -> Result<BrokerOverrides, HandlerError>
where
    H: ClusterHandler + ?Sized,
{
    let mut overrides = handler.get_broker_overrides().await?;
    let reassignments = handler.get_reassignments().await?;
    let participants = reassigning_brokers(handler, &reassignments).await?;
    overrides.mark_reassignment_participants(&participants);

    debug!(
        overrides = overrides.len(),
        participants = participants.len(),
        "loaded broker overrides"
    );

    Ok(overrides)
}

/// Brokers taking part in `reassignments`, sources and destinations.
///
/// Only the reassigning topics are fetched, a topic deleted meanwhile contributes
/// its target replicas only.
pub async fn reassigning_brokers<H>(
    handler: &H,
    reassignments: &Reassignments,
) -> Result<BTreeSet<BrokerId>, HandlerError>
where
    H: ClusterHandler + ?Sized,
{
    let mut states = TopicStates::new();
    for topic in reassignments.topics() {
        match handler.get_topic_state(topic).await {
            Ok(state) => states.insert(topic, state),
            Err(HandlerError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(reassignments.participants(&states))
}
