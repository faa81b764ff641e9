use async_trait::async_trait;
use regex::Regex;

use crate::broker::BrokerMetaMap;
use crate::errors::HandlerError;
use crate::overrides::{BrokerOverrides, Reassignments};
use crate::partition_meta::PartitionMetaMap;
use crate::topic_state::TopicState;

/// Outcome of a fetch that may succeed only for part of the records.
///
/// `Partial` carries usable data together with non-fatal diagnostics,
/// `Unavailable` means nothing usable was returned at all.
#[derive(Debug)]
pub enum MetaFetch<T> {
    Complete(T),
    Partial {
        value: T,
        diagnostics: Vec<HandlerError>,
    },
    Unavailable(Vec<HandlerError>),
}

impl<T> MetaFetch<T> {
    pub fn from_parts(value: Option<T>, diagnostics: Vec<HandlerError>) -> Self {
        match value {
            Some(value) if diagnostics.is_empty() => MetaFetch::Complete(value),
            Some(value) => MetaFetch::Partial { value, diagnostics },
            None => MetaFetch::Unavailable(diagnostics),
        }
    }

    pub fn into_parts(self) -> (Option<T>, Vec<HandlerError>) {
        match self {
            MetaFetch::Complete(value) => (Some(value), Vec::new()),
            MetaFetch::Partial { value, diagnostics } => (Some(value), diagnostics),
            MetaFetch::Unavailable(diagnostics) => (None, diagnostics),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            MetaFetch::Complete(value) | MetaFetch::Partial { value, .. } => Some(value),
            MetaFetch::Unavailable(_) => None,
        }
    }

    pub fn diagnostics(&self) -> &[HandlerError] {
        match self {
            MetaFetch::Complete(_) => &[],
            MetaFetch::Partial { diagnostics, .. } | MetaFetch::Unavailable(diagnostics) => {
                diagnostics
            }
        }
    }
}

/// Read access to the cluster state held by the coordination service.
#[async_trait]
pub trait ClusterHandler: Send + Sync {
    /// Topic names matching `pattern`, sorted.
    async fn list_topics(&self, pattern: &Regex) -> Result<Vec<String>, HandlerError>;

    async fn get_topic_state(&self, topic: &str) -> Result<TopicState, HandlerError>;

    /// Registered brokers, optionally merged with collected metrics.
    async fn get_all_broker_meta(&self, include_metrics: bool) -> MetaFetch<BrokerMetaMap>;

    async fn get_all_partition_meta(&self) -> Result<PartitionMetaMap, HandlerError>;

    /// Configured static overrides; `reassignment_participant` is left unset.
    async fn get_broker_overrides(&self) -> Result<BrokerOverrides, HandlerError>;

    /// Partition reassignments currently in flight.
    async fn get_reassignments(&self) -> Result<Reassignments, HandlerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_classifies() {
        assert!(matches!(
            MetaFetch::from_parts(Some(1), vec![]),
            MetaFetch::Complete(1)
        ));
        assert!(matches!(
            MetaFetch::from_parts(Some(1), vec![HandlerError::NoBrokersRegistered]),
            MetaFetch::Partial { value: 1, .. }
        ));

        let unavailable: MetaFetch<u8> =
            MetaFetch::from_parts(None, vec![HandlerError::NoBrokersRegistered]);
        assert!(unavailable.value().is_none());
        assert_eq!(unavailable.diagnostics().len(), 1);
    }
}
