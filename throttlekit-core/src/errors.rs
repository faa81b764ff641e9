use thiserror::Error;
use throttlekit_metadata_store::MetadataError;

use crate::broker::BrokerId;

/// Errors raised while reading cluster state from the coordination store.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("metadata store error: {0}")]
    Store(#[from] MetadataError),

    #[error("node {0} not found")]
    NotFound(String),

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed record at {path}: {reason}")]
    MalformedRecord { path: String, reason: String },

    #[error("no brokers registered")]
    NoBrokersRegistered,

    #[error("Metrics not found for broker {0}")]
    MetricsNotFound(BrokerId),

    #[error("Metrics reported for unregistered broker {0}")]
    UnregisteredBroker(BrokerId),
}

/// Conditions under which the calling operation cannot continue.
///
/// Helpers return these instead of terminating, the binary decides how to halt.
#[derive(Error, Debug)]
pub enum FatalError {
    #[error("broker metadata unavailable ({} error(s))", .0.len())]
    BrokerMetaUnavailable(Vec<HandlerError>),

    #[error("metrics incomplete for {} broker(s)", .0.len())]
    MetricsIncomplete(Vec<BrokerId>),
}

impl FatalError {
    /// Every underlying diagnostic, one line each.
    pub fn diagnostics(&self) -> Vec<String> {
        match self {
            FatalError::BrokerMetaUnavailable(errors) => {
                errors.iter().map(|e| e.to_string()).collect()
            }
            FatalError::MetricsIncomplete(ids) => ids
                .iter()
                .map(|id| format!("Metrics not found for broker {}", id))
                .collect(),
        }
    }
}
