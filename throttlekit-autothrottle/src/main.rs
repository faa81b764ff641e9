use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use throttlekit_autothrottle::{
    config::ServiceConfiguration, watch_triggers, LogWriter, PassOutcome, ThrottleService,
};
use throttlekit_core::StoreHandler;
use throttlekit_metadata_store::MemoryStore;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "autothrottle")]
#[command(
    about = "Computes which replicas need replication throttles during data movement",
    long_about = None
)]
struct Args {
    #[arg(long, help = "Path to the YAML config file")]
    config_file: PathBuf,
    #[arg(long, help = "Topics regex (overrides the config file)")]
    topics: Option<String>,
    #[arg(long, help = "Coordination store snapshot (overrides the config file)")]
    snapshot: Option<PathBuf>,
    #[arg(long, default_value_t = false, help = "Run a single pass and print the targets as json")]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = ServiceConfiguration::from_file(&args.config_file)?;
    if let Some(topics) = args.topics.as_deref() {
        config.set_topics(topics)?;
    }
    if let Some(snapshot) = args.snapshot {
        config.snapshot = snapshot;
    }

    info!(snapshot = %config.snapshot.display(), "loading coordination store snapshot");
    let store = MemoryStore::from_snapshot_file(&config.snapshot).with_context(|| {
        format!("Failed to load snapshot {}", config.snapshot.display())
    })?;

    let handler = Arc::new(StoreHandler::new(store.clone()));
    let mut service = ThrottleService::new(
        handler,
        LogWriter,
        config.topics.clone(),
        config.interval,
    )
    .with_fetch_concurrency(config.fetch_concurrency);

    if args.once {
        if let PassOutcome::Applied(index) = service.run_once().await? {
            println!("{}", serde_json::to_string_pretty(&index)?);
        }
        return Ok(());
    }

    let triggers = watch_triggers(&store).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // reload the snapshot, changes wake the service through the store watchers
    let reload_store = store.clone();
    let snapshot = config.snapshot.clone();
    let reload_interval = config.reload_interval;
    let mut reload_shutdown = shutdown_rx.clone();
    let reloader = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(reload_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = reload_store.load_snapshot_file(&snapshot) {
                        warn!(error = %e, "snapshot reload failed, keeping previous state");
                    }
                }
                _ = reload_shutdown.changed() => break,
            }
        }
    });

    info!(
        topics = config.topics.as_str(),
        interval_seconds = config.interval.as_secs(),
        "starting autothrottle"
    );
    let service = tokio::spawn(service.run(Some(triggers), shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("shutdown requested");
    let _ = shutdown_tx.send(true);

    service.await??;
    reloader.await?;
    Ok(())
}
