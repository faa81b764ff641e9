use anyhow::{Context, Result};
use clap::Args;
use prettytable::{format, Cell, Row, Table};
use regex::Regex;
use throttlekit_autothrottle::{
    compute_throttle_targets, load_broker_overrides, ThrottledReplicaIndex,
};
use throttlekit_core::ClusterHandler;

use crate::shared::{is_json, Source};

#[derive(Debug, Args)]
pub(crate) struct Targets {
    #[command(flatten)]
    source: Source,
    #[arg(long, default_value = ".*", help = "Regex selecting the topics to inspect")]
    topics: String,
    #[arg(long, default_value_t = 8, help = "Max topic state requests in flight")]
    fetch_concurrency: usize,
    #[arg(long, value_parser = ["json"], help = "Output format: json (default: table)")]
    output: Option<String>,
}

pub(crate) async fn handle_command(targets: Targets) -> Result<()> {
    let handler = targets.source.handler()?;
    let pattern = Regex::new(&targets.topics)
        .with_context(|| format!("Invalid topics regex: {}", targets.topics))?;

    let index = collect(&handler, &pattern, targets.fetch_concurrency).await?;

    if is_json(&targets.output) {
        println!("{}", serde_json::to_string_pretty(&index)?);
    } else {
        print_table(&index);
    }
    Ok(())
}

pub(crate) async fn collect<H: ClusterHandler>(
    handler: &H,
    pattern: &Regex,
    fetch_concurrency: usize,
) -> Result<ThrottledReplicaIndex> {
    let overrides = load_broker_overrides(handler)
        .await
        .context("Failed to load broker overrides")?;
    let index = compute_throttle_targets(handler, pattern, &overrides, fetch_concurrency)
        .await
        .context("Failed to compute throttle targets")?;
    Ok(index)
}

fn print_table(index: &ThrottledReplicaIndex) {
    if index.is_empty() {
        println!("No replicas to throttle");
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.add_row(Row::new(vec![
        Cell::new("TOPIC"),
        Cell::new("ROLE"),
        Cell::new("REPLICAS"),
    ]));
    for entry in index.config_entries() {
        table.add_row(Row::new(vec![
            Cell::new(&entry.topic),
            Cell::new(entry.role.as_str()),
            Cell::new(&entry.replicas),
        ]));
    }
    table.printstd();
}
