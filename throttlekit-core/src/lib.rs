//! # Throttlekit Core
//!
//! Cluster model shared by the autothrottle daemon and the operator cli.
//!
//! - **Topology**: [`TopicState`] / [`TopicStates`], partition to ordered replica list.
//! - **Brokers**: registration metadata merged with collected metrics ([`BrokerMetaMap`]).
//! - **Overrides**: static per-broker throttle overrides and reassignment participation.
//! - **Handler**: [`ClusterHandler`], the read interface to the coordination store,
//!   implemented over any `MetadataStore` by [`StoreHandler`].
//! - **Reconciliation**: [`metadata::reconcile_broker_meta`] and
//!   [`metadata::validate_broker_metrics`], which turn partial metadata into a typed
//!   [`FatalError`] when an operation cannot proceed.

mod broker;
mod errors;
mod handler;
pub mod metadata;
mod overrides;
mod partition_meta;
mod store_handler;
mod topic_state;

pub use broker::{Broker, BrokerId, BrokerMap, BrokerMeta, BrokerMetaMap, BrokerMetrics};
pub use errors::{FatalError, HandlerError};
pub use handler::{ClusterHandler, MetaFetch};
pub use overrides::{
    BrokerOverrides, BrokerThrottleOverride, Reassignments, ThrottleOverrideConfig,
};
pub use partition_meta::{PartitionMeta, PartitionMetaMap};
pub use store_handler::{
    StoreHandler, BASE_BROKER_IDS_PATH, BASE_OVERRIDES_PATH, BASE_TOPICS_PATH,
    BROKER_METRICS_PATH, PARTITION_META_PATH, REASSIGN_PARTITIONS_PATH,
};
pub use topic_state::{PartitionId, TopicState, TopicStates};
