use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docchat::Result;
use docchat::commands::{chat, drop_collection, ingest, search};
use docchat::config::AppConfig;
use docchat::provider::Provider;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Chat with your PDF documents using pgvector-backed retrieval")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a PDF into the selected provider's collection
    Ingest {
        /// Embedding provider (defaults to EMBEDDING_PROVIDER, then huggingface)
        #[arg(long)]
        provider: Option<Provider>,
        /// Path to the PDF (defaults to PDF_PATH)
        #[arg(long)]
        document: Option<PathBuf>,
    },
    /// Search the collection and print the top-K matches with scores
    Search {
        /// The query text
        #[arg(short = 'q', long)]
        query: String,
        /// Embedding provider (must match the one used at ingestion)
        #[arg(long)]
        provider: Option<Provider>,
        /// Number of matches to return
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Interactive chat grounded in the ingested documents
    Chat {
        /// Embedding provider (must match the one used at ingestion)
        #[arg(long)]
        provider: Option<Provider>,
    },
    /// Drop a provider's collection for a clean re-ingestion
    Drop {
        /// Embedding provider whose collection to drop
        #[arg(long)]
        provider: Option<Provider>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Ingest { provider, document } => {
            let provider = provider.unwrap_or(config.default_provider);
            ingest(&config, provider, document).await?;
        }
        Commands::Search {
            query,
            provider,
            top_k,
        } => {
            let provider = provider.unwrap_or(config.default_provider);
            search(&config, provider, &query, top_k).await?;
        }
        Commands::Chat { provider } => {
            let provider = provider.unwrap_or(config.default_provider);
            chat(&config, provider).await?;
        }
        Commands::Drop { provider } => {
            let provider = provider.unwrap_or(config.default_provider);
            drop_collection(&config, provider).await?;
        }
    }

    Ok(())
}
