//! Command-line interface for neo4j-cdc
//!
//! # Usage Examples
//!
//! ```bash
//! # Change ids
//! neo4j-cdc earliest --uri bolt://localhost:7687
//! neo4j-cdc current
//!
//! # One query from a known change id
//! neo4j-cdc query --from "A3V1bGTx..." --pattern "(:Person)"
//!
//! # Stream with checkpoints
//! neo4j-cdc stream --from current \
//!   --pattern "(:Person{-password})" \
//!   --poll-interval 500ms \
//!   --checkpoint-dir .neo4j-cdc-checkpoints
//! ```
//!
//! Events are printed as JSON lines on stdout. Logging goes to stderr and is
//! controlled with `RUST_LOG`.

use anyhow::Context;
use cdc_core::{ChangeEvent, ChangeIdentifier};
use checkpoint::{load_checkpoint, save_checkpoint, FilesystemStore, StreamName};
use clap::{Parser, Subcommand};
use neo4j_cdc::config::parse_duration;
use neo4j_cdc::{ConnectionOpts, SelectorOpts, StartPosition};
use neo4j_cdc_source::{new_neo4j_client, CdcCheckpoint, CdcClient, ChangeStream, SourceOpts};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "neo4j-cdc")]
#[command(about = "Query and stream Neo4j change data capture events")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the id of the oldest available change
    Earliest {
        #[command(flatten)]
        connection: ConnectionOpts,
    },

    /// Print the id of the most recent change
    Current {
        #[command(flatten)]
        connection: ConnectionOpts,
    },

    /// Print the changes after a position, then the last known change id
    Query {
        #[command(flatten)]
        connection: ConnectionOpts,

        #[command(flatten)]
        selector: SelectorOpts,

        /// Start position: earliest, current or a change id
        #[arg(long, default_value = "current")]
        from: StartPosition,
    },

    /// Print changes continuously, polling for new ones
    Stream {
        #[command(flatten)]
        connection: ConnectionOpts,

        #[command(flatten)]
        selector: SelectorOpts,

        /// Start position: earliest, current, checkpoint or a change id
        #[arg(long, default_value = "current")]
        from: StartPosition,

        /// Delay between queries when there are no new changes
        #[arg(long, default_value = "1s", value_parser = parse_duration)]
        poll_interval: Duration,

        /// Directory to save the stream position in after every change
        #[arg(long)]
        checkpoint_dir: Option<String>,

        /// Name the position is saved under (letters, digits, '-' and '_')
        #[arg(long, default_value = "stream", value_parser = parse_stream_name)]
        checkpoint_name: StreamName,

        /// Stop after this many changes
        #[arg(long)]
        max_events: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Earliest { connection } => {
            let client = connect(&connection, Vec::new()).await?;
            println!("{}", client.earliest().await?);
        }
        Commands::Current { connection } => {
            let client = connect(&connection, Vec::new()).await?;
            println!("{}", client.current().await?);
        }
        Commands::Query {
            connection,
            selector,
            from,
        } => {
            let client = connect(&connection, selector.selectors()?).await?;
            let from = match from {
                StartPosition::Checkpoint => {
                    anyhow::bail!("--from checkpoint is only supported by the stream command")
                }
                other => resolve_position(&client, other).await?,
            };

            let batch = client.query(&from).await?;
            for item in batch.events {
                match item {
                    Ok(change) => print_change(&change)?,
                    Err(e) => tracing::warn!("{e:#}"),
                }
            }
            println!("{}", batch.last_known);
        }
        Commands::Stream {
            connection,
            selector,
            from,
            poll_interval,
            checkpoint_dir,
            checkpoint_name,
            max_events,
        } => {
            let client = connect(&connection, selector.selectors()?)
                .await?
                .with_poll_interval(poll_interval);
            let store = checkpoint_dir.map(|dir| FilesystemStore::new(dir));

            let from = match from {
                StartPosition::Checkpoint => {
                    let store = store
                        .as_ref()
                        .context("--from checkpoint requires --checkpoint-dir")?;
                    let checkpoint: CdcCheckpoint = load_checkpoint(store, &checkpoint_name)
                        .await?
                        .with_context(|| {
                            format!(
                                "No checkpoint named '{checkpoint_name}' in {}",
                                store.dir().display()
                            )
                        })?;
                    tracing::info!(
                        "Resuming from checkpoint {} ({})",
                        checkpoint.change_id,
                        checkpoint.timestamp
                    );
                    checkpoint.change_id
                }
                other => resolve_position(&client, other).await?,
            };

            tracing::info!("Streaming changes from {from}");
            let mut stream = client.stream(from);
            let mut delivered = 0;

            while max_events.map_or(true, |max| delivered < max) {
                let Some(item) = stream.next().await else {
                    break;
                };
                let change = match item {
                    Ok(change) => change,
                    Err(e) => {
                        tracing::warn!("{e:#}");
                        continue;
                    }
                };
                print_change(&change)?;
                delivered += 1;

                if let (Some(store), Some(checkpoint)) = (&store, stream.checkpoint()) {
                    save_checkpoint(store, &checkpoint_name, &checkpoint)
                        .await
                        .context("Failed to save checkpoint")?;
                }
            }
            tracing::info!("Stopped after {delivered} changes");
        }
    }

    Ok(())
}

async fn connect(
    connection: &ConnectionOpts,
    selectors: Vec<cdc_selector::Selector>,
) -> anyhow::Result<CdcClient> {
    for selector in &selectors {
        tracing::debug!("Selector: {selector}");
    }
    let graph = new_neo4j_client(&SourceOpts::from(connection)).await?;
    Ok(CdcClient::new(graph, selectors))
}

async fn resolve_position(
    client: &CdcClient,
    position: StartPosition,
) -> anyhow::Result<ChangeIdentifier> {
    match position {
        StartPosition::Earliest => client.earliest().await,
        StartPosition::Current => client.current().await,
        StartPosition::Id(id) => Ok(id),
        StartPosition::Checkpoint => anyhow::bail!("Checkpoint positions are resolved by the caller"),
    }
}

fn parse_stream_name(s: &str) -> anyhow::Result<StreamName> {
    StreamName::new(s)
}

fn print_change(change: &ChangeEvent) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(change)?);
    Ok(())
}
