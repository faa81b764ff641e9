use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use throttlekit_core::StoreHandler;
use throttlekit_metadata_store::MemoryStore;

/// Where the cluster state is read from.
#[derive(Debug, Args)]
pub(crate) struct Source {
    #[arg(long, help = "Coordination store snapshot, a json object of path to value")]
    pub(crate) snapshot: PathBuf,
}

impl Source {
    pub(crate) fn handler(&self) -> Result<StoreHandler<MemoryStore>> {
        let store = MemoryStore::from_snapshot_file(&self.snapshot)
            .with_context(|| format!("Failed to load snapshot {}", self.snapshot.display()))?;
        Ok(StoreHandler::new(store))
    }
}

pub(crate) fn is_json(output: &Option<String>) -> bool {
    matches!(output.as_deref(), Some("json"))
}

/// Parses `1001,1002` into broker ids.
pub(crate) fn parse_broker_list(value: &str) -> Result<Vec<u32>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("Invalid broker id: {}", s))
        })
        .collect()
}
