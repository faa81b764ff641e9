use anyhow::Result;
use clap::Args;
use prettytable::{format, Cell, Row, Table};
use throttlekit_core::metadata::{reconcile_broker_meta, validate_broker_metrics};
use throttlekit_core::{Broker, BrokerId, BrokerMap, BrokerMetaMap, ClusterHandler};

use crate::shared::{is_json, parse_broker_list, Source};

#[derive(Debug, Args)]
pub(crate) struct BrokerMeta {
    #[command(flatten)]
    source: Source,
    #[arg(long, default_value_t = false, help = "Skip merging the collected broker metrics")]
    no_metrics: bool,
    #[arg(long, help = "Comma separated broker ids that must have complete metrics")]
    brokers: Option<String>,
    #[arg(long, value_parser = ["json"], help = "Output format: json (default: table)")]
    output: Option<String>,
}

pub(crate) async fn handle_command(args: BrokerMeta) -> Result<()> {
    let handler = args.source.handler()?;
    let reference = match args.brokers.as_deref() {
        Some(list) => Some(reference_brokers(&parse_broker_list(list)?)),
        None => None,
    };

    let meta = collect(&handler, !args.no_metrics, reference.as_ref()).await?;

    if is_json(&args.output) {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else {
        print_table(&meta);
    }
    Ok(())
}

/// Reconciled broker metadata, validated against `reference` when given.
pub(crate) async fn collect<H: ClusterHandler>(
    handler: &H,
    include_metrics: bool,
    reference: Option<&BrokerMap>,
) -> Result<BrokerMetaMap> {
    let meta = reconcile_broker_meta(handler, include_metrics).await?;
    if let Some(reference) = reference {
        validate_broker_metrics(reference, &meta)?;
    }
    Ok(meta)
}

fn reference_brokers(ids: &[u32]) -> BrokerMap {
    ids.iter()
        .map(|id| (BrokerId(*id), Broker::new(BrokerId(*id))))
        .collect()
}

fn print_table(meta: &BrokerMetaMap) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("HOST"),
        Cell::new("RACK"),
        Cell::new("STORAGE FREE"),
        Cell::new("METRICS INCOMPLETE"),
        Cell::new("MISSING"),
    ]));
    for (id, broker) in meta {
        table.add_row(Row::new(vec![
            Cell::new(&id.to_string()),
            Cell::new(broker.host.as_deref().unwrap_or("-")),
            Cell::new(broker.rack.as_deref().unwrap_or("-")),
            Cell::new(&format!("{:.2}", broker.storage_free)),
            Cell::new(&broker.metrics_incomplete.to_string()),
            Cell::new(&broker.missing.to_string()),
        ]));
    }
    table.printstd();
}
