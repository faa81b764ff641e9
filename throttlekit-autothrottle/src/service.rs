use anyhow::{Context, Result};
use futures::{FutureExt, StreamExt};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use throttlekit_core::{
    ClusterHandler, BASE_OVERRIDES_PATH, BASE_TOPICS_PATH, REASSIGN_PARTITIONS_PATH,
};
use throttlekit_metadata_store::{MetadataStore, WatchEvent, WatchStream};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::throttled::ThrottledReplicaIndex;
use crate::topics::{compute_throttle_targets, load_broker_overrides};
use crate::writer::ThrottleWriter;

/// Result of one throttle pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// The index differed from the previous pass and was handed to the writer.
    Applied(ThrottledReplicaIndex),
    /// Same targets as the last applied pass, the writer was not called.
    Unchanged,
}

/// Combined change stream for the paths that affect throttle targets.
pub async fn watch_triggers<S: MetadataStore>(store: &S) -> Result<WatchStream> {
    let mut streams = Vec::new();
    for prefix in [BASE_TOPICS_PATH, BASE_OVERRIDES_PATH, REASSIGN_PARTITIONS_PATH] {
        streams.push(store.watch(prefix).await?);
    }
    Ok(WatchStream::new(futures::stream::select_all(streams)))
}

/// Control loop recomputing the throttle targets from the coordination store.
pub struct ThrottleService<H, W> {
    handler: Arc<H>,
    writer: W,
    topics: Regex,
    fetch_concurrency: usize,
    interval: Duration,
    last_applied: Option<ThrottledReplicaIndex>,
}

impl<H, W> std::fmt::Debug for ThrottleService<H, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottleService")
            .field("topics", &self.topics.as_str())
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("interval", &self.interval)
            .field("has_applied", &self.last_applied.is_some())
            .finish()
    }
}

impl<H, W> ThrottleService<H, W>
where
    H: ClusterHandler,
    W: ThrottleWriter,
{
    pub fn new(handler: Arc<H>, writer: W, topics: Regex, interval: Duration) -> Self {
        ThrottleService {
            handler,
            writer,
            topics,
            fetch_concurrency: 1,
            interval,
            last_applied: None,
        }
    }

    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency.max(1);
        self
    }

    /// Runs one complete pass against the current cluster state.
    ///
    /// Any fetch error aborts the pass before the writer sees anything.
    pub async fn run_once(&mut self) -> Result<PassOutcome> {
        let handler = self.handler.as_ref();

        let overrides = load_broker_overrides(handler)
            .await
            .context("failed to load broker overrides")?;

        let index = compute_throttle_targets(
            handler,
            &self.topics,
            &overrides,
            self.fetch_concurrency,
        )
        .await
        .context("failed to compute throttle targets")?;

        if self.last_applied.as_ref() == Some(&index) {
            debug!("throttle targets unchanged");
            return Ok(PassOutcome::Unchanged);
        }

        self.writer
            .apply(&index)
            .await
            .context("failed to apply throttle targets")?;

        info!(
            topics = index.len(),
            replicas = index.replica_count(),
            "applied throttle targets"
        );
        self.last_applied = Some(index.clone());
        Ok(PassOutcome::Applied(index))
    }

    /// Runs a pass on every interval tick and on every change reported by
    /// `triggers`, until `shutdown` turns true or its sender is dropped.
    ///
    /// A failed pass is logged and retried on the next wake up.
    pub async fn run(
        mut self,
        mut triggers: Option<WatchStream>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                Some(event) = next_trigger(&mut triggers) => {
                    log_trigger(event);
                    // a snapshot reload reports many keys at once
                    drain_ready(&mut triggers);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("throttle service stopped");
                        return Ok(());
                    }
                    continue;
                }
            }

            if let Err(e) = self.run_once().await {
                error!("throttle pass failed: {:#}", e);
            }
        }
    }
}

async fn next_trigger(
    triggers: &mut Option<WatchStream>,
) -> Option<throttlekit_metadata_store::Result<WatchEvent>> {
    match triggers {
        Some(stream) => stream.next().await,
        None => futures::future::pending().await,
    }
}

fn drain_ready(triggers: &mut Option<WatchStream>) {
    if let Some(stream) = triggers {
        while let Some(Some(event)) = stream.next().now_or_never() {
            log_trigger(event);
        }
    }
}

fn log_trigger(event: throttlekit_metadata_store::Result<WatchEvent>) {
    match event {
        Ok(event) => debug!(%event, "cluster change"),
        // lagging only means some changes were coalesced, the pass reads everything
        Err(e) => debug!(error = %e, "watch lagged"),
    }
}
