mod brokers;
mod partitions;
mod shared;
mod targets;

use brokers::BrokerMeta;
use partitions::PartitionMeta;
use targets::Targets;

use clap::{Parser, Subcommand};
use throttlekit_core::FatalError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "throttlekit")]
#[command(
    about = "Inspect throttle targets and placement metadata of a cluster",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Show the replicas that need a replication throttle")]
    Targets(Targets),
    #[command(name = "broker-meta", about = "Show broker metadata merged with collected metrics")]
    BrokerMeta(BrokerMeta),
    #[command(name = "partition-meta", about = "Show partition size metadata")]
    PartitionMeta(PartitionMeta),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Targets(targets) => targets::handle_command(targets).await,
        Commands::BrokerMeta(brokers) => brokers::handle_command(brokers).await,
        Commands::PartitionMeta(partitions) => partitions::handle_command(partitions).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        // operators script around this output: every diagnostic, then exit 1
        match e.downcast_ref::<FatalError>() {
            Some(fatal) => {
                for line in fatal.diagnostics() {
                    println!("{}", line);
                }
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}
