use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::throttled::ThrottledReplicaIndex;

/// Receives the throttle targets of a pass and applies them to the cluster.
#[async_trait]
pub trait ThrottleWriter: Send + Sync {
    async fn apply(&self, index: &ThrottledReplicaIndex) -> Result<()>;
}

/// Writer that only reports the topic configs a pass would set.
#[derive(Debug, Clone, Default)]
pub struct LogWriter;

#[async_trait]
impl ThrottleWriter for LogWriter {
    async fn apply(&self, index: &ThrottledReplicaIndex) -> Result<()> {
        if index.is_empty() {
            info!("no replicas to throttle");
            return Ok(());
        }

        for entry in index.config_entries() {
            info!(
                topic = %entry.topic,
                config = entry.config_name(),
                replicas = %entry.replicas,
                "throttled replicas"
            );
        }
        Ok(())
    }
}
