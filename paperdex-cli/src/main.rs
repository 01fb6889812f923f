//! paperdex CLI — index PDF papers and search them from the terminal.
//!
//! # Commands
//!
//! ```bash
//! # Index one paper
//! paperdex add paper.pdf
//!
//! # Index a batch
//! paperdex batch papers/*.pdf
//!
//! # Search, optionally filtered by year
//! paperdex search "contrastive pretraining" -k 5 --year 2024
//!
//! # Collection statistics / full wipe
//! paperdex stats
//! paperdex reset
//! ```
//!
//! Without the `local-embeddings` feature the CLI falls back to
//! deterministic hash embeddings, which exercise the pipeline but carry no
//! semantics.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use paperdex_core::{
    DocumentSource, EmbeddingProvider, MetadataFilter, PaperManager, PaperdexConfig,
    PersistentIndex,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paperdex")]
#[command(about = "Local semantic search over PDF paper collections")]
#[command(version)]
struct Cli {
    /// Directory holding the persistent index
    #[arg(long, default_value = "./chroma_db", global = true)]
    data_dir: String,

    /// Collection name inside the index
    #[arg(long, default_value = "papers", global = true)]
    collection: String,

    /// Embedding model identifier
    #[arg(long, default_value = paperdex_core::DEFAULT_MODEL_NAME, global = true)]
    model: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a single PDF
    Add {
        /// Path to the PDF file
        path: PathBuf,

        /// Override the extracted title
        #[arg(long)]
        title: Option<String>,

        /// Override the extracted year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Index a batch of PDFs, continuing past per-file failures
    Batch {
        /// Paths to PDF files
        paths: Vec<PathBuf>,
    },

    /// Search the collection with a natural-language query
    Search {
        /// The query text
        query: String,

        /// Number of results to return
        #[arg(short, long, default_value = "5")]
        k: usize,

        /// Only match papers from this year
        #[arg(long)]
        year: Option<i32>,

        /// Only match papers with exactly this title
        #[arg(long)]
        title: Option<String>,
    },

    /// Show collection statistics
    Stats,

    /// Delete every record in the collection
    Reset,
}

#[cfg(feature = "local-embeddings")]
fn build_provider(model: &str) -> Result<Arc<dyn EmbeddingProvider>> {
    Ok(Arc::new(paperdex_core::LocalEmbeddingProvider::new(model, None)?))
}

#[cfg(not(feature = "local-embeddings"))]
fn build_provider(_model: &str) -> Result<Arc<dyn EmbeddingProvider>> {
    tracing::warn!("built without local-embeddings; using deterministic hash embeddings");
    Ok(Arc::new(paperdex_core::HashEmbeddingProvider::default()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let config = PaperdexConfig::builder()
        .collection_name(&cli.collection)
        .persist_directory(&cli.data_dir)
        .model_name(&cli.model)
        .build()?;
    let provider = build_provider(&cli.model)?;
    let index = Arc::new(PersistentIndex::open(&cli.data_dir, &cli.collection, provider)?);
    let manager = PaperManager::builder().config(config).index(index).build()?;

    match cli.command {
        Commands::Add { path, title, year } => {
            let overrides = paperdex_core::MetadataOverrides { title, year, ..Default::default() };
            match manager.add_document(DocumentSource::Path(path), Some(overrides)).await? {
                paperdex_core::AddOutcome::Added { doc_id, chunks_added, metadata } => {
                    println!("Added \"{}\" ({} chunks, id {doc_id})", metadata.title, chunks_added);
                }
                paperdex_core::AddOutcome::NoText { filename } => {
                    println!("No text extracted from {filename}; nothing indexed");
                }
            }
        }

        Commands::Batch { paths } => {
            let report = manager.add_documents_batch(&paths).await;
            println!(
                "{}/{} documents indexed ({} chunks), {} failed",
                report.successful, report.total, report.total_chunks, report.failed
            );
            for detail in report.details.iter().filter(|d| d.error.is_some()) {
                println!(
                    "  {}: {}",
                    detail.filename,
                    detail.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        Commands::Search { query, k, year, title } => {
            let filter = MetadataFilter { doc_id: None, year, title };
            let filter = if filter.is_empty() { None } else { Some(filter) };

            let hits = manager.search(&query, Some(k), filter).await?;
            if hits.is_empty() {
                println!("No results");
            }
            for (rank, hit) in hits.iter().enumerate() {
                let year = hit.year.map_or_else(|| "----".to_string(), |y| y.to_string());
                println!(
                    "{}. [{:.3}] {} ({year}) — {} #{}",
                    rank + 1,
                    hit.score,
                    hit.title,
                    hit.filename,
                    hit.chunk_index,
                );
                println!("   {}", hit.text.replace('\n', " "));
            }
        }

        Commands::Stats => {
            let stats = manager.stats().await?;
            println!("Collection:  {}", stats.collection_name);
            println!("Model:       {}", stats.model_name);
            println!("Chunks:      {}", stats.total_chunks);
            println!("Papers:      {}", stats.total_papers);
            println!("Chunk size:  {} (overlap {})", stats.chunk_size, stats.chunk_overlap);
        }

        Commands::Reset => {
            manager.reset().await?;
            println!("Collection wiped");
        }
    }

    Ok(())
}
