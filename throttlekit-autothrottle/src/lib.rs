//! # Throttlekit Autothrottle
//!
//! Decides which replicas receive a replication throttle marker while data moves
//! between brokers.
//!
//! ## Pass
//! 1. Load static broker overrides and in-flight reassignments from the store
//! 2. Flag override brokers taking part in a reassignment, their throttle is owned
//!    by the reassignment mechanism
//! 3. Fetch the topology of every selected topic
//! 4. Record each replica hosted by a remaining override broker, leader or follower
//!    by its position in the partition's replica list
//! 5. Hand the resulting [`ThrottledReplicaIndex`] to a [`ThrottleWriter`]
//!
//! Every pass rebuilds its state from the store, nothing is carried across passes
//! except the last applied index used to skip redundant writes.

pub mod config;
mod service;
mod throttled;
mod topics;
mod writer;

pub use service::{watch_triggers, PassOutcome, ThrottleService};
pub use throttled::{ConfigEntry, ReplicaDescriptor, ReplicaRole, Throttled, ThrottledReplicaIndex};
pub use topics::{
    compute_throttle_targets, get_all_topic_states, load_broker_overrides, reassigning_brokers,
    throttle_targets,
};
pub use writer::{LogWriter, ThrottleWriter};
