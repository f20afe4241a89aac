//! CLI interface for the offline-first vector index

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pocketvec::{ClientVectorIndex, IndexConfig, MathBackend, Metadata, SyncConfig};

#[derive(Parser)]
#[command(name = "pocketvec")]
#[command(about = "An offline-first embedded vector index", long_about = None)]
struct Cli {
    /// Vector dimension enforced by the index
    #[arg(long, default_value = "384")]
    dimension: usize,

    /// Math backend to use
    #[arg(long, value_enum, default_value = "accelerated")]
    backend: BackendArg,

    /// Data directory for durable storage. If unset, runs in memory only.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Remote reconciliation endpoint used by the sync command
    #[arg(long)]
    sync_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum BackendArg {
    Accelerated,
    Reference,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a document vector
    Add {
        /// Document ID
        id: String,
        /// Vector data as comma-separated values (e.g., "1.0,2.0,3.0")
        #[arg(short, long)]
        vector: String,
        /// Metadata fields as key=value pairs
        #[arg(short, long)]
        meta: Vec<String>,
    },
    /// Search for the most similar documents
    Search {
        /// Query vector as comma-separated values (e.g., "1.0,2.0,3.0")
        query: String,
        /// Number of results to return
        #[arg(short, long, default_value = "5")]
        k: usize,
        /// Minimum similarity score
        #[arg(short, long, default_value = "0.0")]
        threshold: f32,
    },
    /// Remove a document
    Remove {
        /// Document ID to remove
        id: String,
    },
    /// List all stored document IDs
    List,
    /// Show index statistics
    Stats,
    /// Write the index snapshot to disk
    Persist,
    /// Push queued mutations to the remote endpoint
    Sync,
    /// Drop all local entries
    Clear,
}

fn parse_vector(s: &str) -> Result<Vec<f32>> {
    s.split(',')
        .map(|x| {
            x.trim()
                .parse::<f32>()
                .map_err(|_| anyhow::anyhow!("Invalid float: {}", x))
        })
        .collect()
}

fn parse_metadata(pairs: &[String]) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid metadata pair (want key=value): {}", pair))?;
        metadata.insert(key, value);
    }
    Ok(metadata)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = IndexConfig::new(cli.dimension).with_backend(match cli.backend {
        BackendArg::Accelerated => MathBackend::Accelerated,
        BackendArg::Reference => MathBackend::Reference,
    });
    if let Some(dir) = cli.data_dir.clone() {
        config = config.with_data_dir(dir);
    }
    if let Some(endpoint) = cli.sync_endpoint.clone() {
        config = config.with_sync(SyncConfig::new(endpoint));
    }

    let mut index = ClientVectorIndex::new(config);
    index.initialize().await?;

    match cli.command {
        Commands::Add { id, vector, meta } => {
            let v = parse_vector(&vector)?;
            let metadata = parse_metadata(&meta)?;
            index.add_document(id.clone(), v, metadata).await?;
            println!("Added document: {}", id);
        }
        Commands::Search {
            query,
            k,
            threshold,
        } => {
            let q = parse_vector(&query)?;
            let results = index.search(&q, k, threshold).await?;

            if results.is_empty() {
                println!("No results found");
            } else {
                println!("Top {} results:", results.len());
                for (i, hit) in results.iter().enumerate() {
                    println!("{}. {} (score: {:.4})", i + 1, hit.id, hit.score);
                }
            }
        }
        Commands::Remove { id } => {
            index.remove_vector(&id).await?;
            println!("Removed document: {}", id);
        }
        Commands::List => {
            let ids = index.document_ids();
            if ids.is_empty() {
                println!("No documents stored");
            } else {
                println!("Document IDs ({} total):", ids.len());
                for id in ids {
                    println!("  - {}", id);
                }
            }
        }
        Commands::Stats => {
            let stats = index.stats();
            println!("count: {}", stats.count);
            println!("initialized: {}", stats.initialized);
            println!("pending sync: {}", index.queued_mutations());
        }
        Commands::Persist => {
            index.persist().await?;
            println!("Snapshot written");
        }
        Commands::Sync => {
            let report = index.sync_with_server().await?;
            println!("synced: {}, failed: {}", report.synced, report.failed);
        }
        Commands::Clear => {
            index.clear().await?;
            println!("Index cleared");
        }
    }

    index.dispose().await;
    Ok(())
}
