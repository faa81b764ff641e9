use anyhow::{Context, Result};
use clap::Args;
use prettytable::{format, Cell, Row, Table};
use throttlekit_core::metadata::get_partition_meta;
use throttlekit_core::PartitionMetaMap;

use crate::shared::{is_json, Source};

#[derive(Debug, Args)]
pub(crate) struct PartitionMeta {
    #[command(flatten)]
    source: Source,
    #[arg(long, help = "Only show partitions of this topic")]
    topic: Option<String>,
    #[arg(long, value_parser = ["json"], help = "Output format: json (default: table)")]
    output: Option<String>,
}

pub(crate) async fn handle_command(args: PartitionMeta) -> Result<()> {
    let handler = args.source.handler()?;
    let meta = get_partition_meta(&handler)
        .await
        .context("Failed to read partition metadata")?;
    let meta = select(meta, args.topic.as_deref());

    if is_json(&args.output) {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("TOPIC"),
            Cell::new("PARTITION"),
            Cell::new("SIZE"),
        ]));
        for (topic, partition, entry) in meta.iter() {
            table.add_row(Row::new(vec![
                Cell::new(topic),
                Cell::new(&partition.to_string()),
                Cell::new(&format!("{:.2}", entry.size)),
            ]));
        }
        table.printstd();
    }
    Ok(())
}

fn select(meta: PartitionMetaMap, topic: Option<&str>) -> PartitionMetaMap {
    let Some(topic) = topic else {
        return meta;
    };
    let mut selected = PartitionMetaMap::default();
    for (name, partition, entry) in meta.iter().filter(|(name, _, _)| *name == topic) {
        selected.insert(name, partition, entry.clone());
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use throttlekit_core::PartitionMeta as Meta;

    #[test]
    fn select_keeps_one_topic() {
        let mut meta = PartitionMetaMap::default();
        meta.insert("orders", 0, Meta { size: 1.0 });
        meta.insert("orders", 1, Meta { size: 2.0 });
        meta.insert("payments", 0, Meta { size: 3.0 });

        let selected = select(meta.clone(), Some("orders"));
        assert_eq!(selected.len(), 2);
        assert_eq!(selected.size("payments", 0), None);
        assert_eq!(select(meta, None).len(), 3);
    }
}
