use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Unknown embedding provider: '{0}' (expected huggingface, openai, or google)")]
    UnknownProvider(String),

    #[error("Missing credential for {provider}: set {variable} in the environment")]
    MissingCredential {
        provider: &'static str,
        variable: &'static str,
    },

    #[error("Document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        provider: &'static str,
        message: String,
    },

    #[error("Vector store write failed: {0}")]
    StoreWrite(String),

    #[error(
        "Dimension mismatch: collection stores {stored}-dimensional vectors but the query \
         vector has {query} dimensions (was the collection ingested with a different provider?)"
    )]
    DimensionMismatch { stored: usize, query: usize },

    #[error("Collection '{0}' not found (run `docchat ingest` first)")]
    CollectionNotFound(String),

    #[error("Generation error ({model}): {message}")]
    Generation { model: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chunking;
pub mod commands;
pub mod composer;
pub mod config;
pub mod document;
pub mod llm;
pub mod provider;
pub mod store;
