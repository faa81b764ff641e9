use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TOPICS: &str = ".*";
const DEFAULT_INTERVAL_SECONDS: u64 = 180;
const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// configuration settings loaded from the config file
#[derive(Debug, Serialize, Deserialize)]
pub struct LoadConfiguration {
    /// Regular expression selecting the topics to consider (defaults to all)
    pub topics: Option<String>,
    /// Seconds between two throttle passes
    pub interval_seconds: Option<u64>,
    /// Max topic state fetches in flight during a pass
    pub fetch_concurrency: Option<usize>,
    /// Coordination store source
    pub metadata: MetadataConfig,
}

/// Coordination store source
#[derive(Debug, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// JSON snapshot of the coordination store, `{"<path>": <value>}`
    pub snapshot: PathBuf,
    /// Seconds between two snapshot reloads (defaults to the pass interval)
    pub reload_seconds: Option<u64>,
}

/// Settings the autothrottle service runs with
#[derive(Debug, Clone)]
pub struct ServiceConfiguration {
    pub topics: Regex,
    pub interval: Duration,
    pub fetch_concurrency: usize,
    pub snapshot: PathBuf,
    pub reload_interval: Duration,
}

impl ServiceConfiguration {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let load_config: LoadConfiguration = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        load_config.try_into()
    }

    pub fn set_topics(&mut self, pattern: &str) -> Result<()> {
        self.topics = compile_topics(pattern)?;
        Ok(())
    }
}

fn compile_topics(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Invalid topics regex: {}", pattern))
}

fn positive_seconds(name: &str, seconds: u64) -> Result<Duration> {
    if seconds == 0 {
        return Err(anyhow!("{} must be greater than zero", name));
    }
    Ok(Duration::from_secs(seconds))
}

impl TryFrom<LoadConfiguration> for ServiceConfiguration {
    type Error = anyhow::Error;

    fn try_from(config: LoadConfiguration) -> Result<Self> {
        let topics = compile_topics(config.topics.as_deref().unwrap_or(DEFAULT_TOPICS))?;

        let interval = positive_seconds(
            "interval_seconds",
            config.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECONDS),
        )?;

        let reload_interval = match config.metadata.reload_seconds {
            Some(seconds) => positive_seconds("metadata.reload_seconds", seconds)?,
            None => interval,
        };

        let fetch_concurrency = config
            .fetch_concurrency
            .unwrap_or(DEFAULT_FETCH_CONCURRENCY);
        if fetch_concurrency == 0 {
            return Err(anyhow!("fetch_concurrency must be greater than zero"));
        }

        Ok(ServiceConfiguration {
            topics,
            interval,
            fetch_concurrency,
            snapshot: config.metadata.snapshot,
            reload_interval,
        })
    }
}
