use std::io::{BufRead, Write};
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use crate::chunking::{ChunkingConfig, split_document};
use crate::composer::compose_answer;
use crate::config::AppConfig;
use crate::document::load_pdf;
use crate::llm::{ChatModel, chat_model_for};
use crate::provider::{Embedder, Provider, embedder_for};
use crate::store::VectorStore;
use crate::Result;

const EMBEDDING_BATCH_SIZE: usize = 32;

/// Ingest a PDF into the provider's collection: extract, chunk, embed, store.
///
/// Fail-fast: the first embedding or store error aborts the whole run.
/// Re-running appends; use `drop` first for a clean re-ingestion.
#[inline]
pub async fn ingest(config: &AppConfig, provider: Provider, document: Option<PathBuf>) -> Result<()> {
    let path = document.unwrap_or_else(|| config.pdf_path.clone());
    info!(provider = %provider, path = %path.display(), "starting ingestion");

    let source = load_pdf(&path)?;
    let chunks = split_document(&source, &ChunkingConfig::default());
    if chunks.is_empty() {
        println!("No text extracted from {}; nothing to ingest.", path.display());
        return Ok(());
    }
    println!(
        "Split '{}' into {} chunks (window {}, overlap {})",
        source.id,
        chunks.len(),
        ChunkingConfig::default().chunk_size,
        ChunkingConfig::default().overlap
    );

    let embedder = embedder_for(provider, config)?;
    println!("Embedding with provider '{provider}' ({} dimensions)", embedder.dimensions());

    let embeddings = embed_all(embedder.as_ref(), &chunks.iter().map(|c| c.content.clone()).collect::<Vec<_>>())?;

    let collection = provider.collection_name();
    let store = VectorStore::connect(&config.database_url).await?;
    store
        .create_collection(&collection, embedder.dimensions())
        .await?;
    store.insert_chunks(&collection, &chunks, &embeddings).await?;

    println!(
        "Ingested {} chunks from '{}' into collection '{}'",
        chunks.len(),
        source.id,
        collection
    );
    Ok(())
}

/// Embed chunk texts in batches behind a progress bar, preserving order.
fn embed_all(embedder: &dyn Embedder, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let bar = ProgressBar::new(texts.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("Embedding chunks");

    let mut embeddings = Vec::with_capacity(texts.len());
    for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
        let vectors = embedder.embed_batch(batch)?;
        bar.inc(vectors.len() as u64);
        embeddings.extend(vectors);
    }
    bar.finish_and_clear();

    Ok(embeddings)
}

/// Embed a query and print the top-K most similar chunks with scores.
#[inline]
pub async fn search(
    config: &AppConfig,
    provider: Provider,
    query: &str,
    top_k: Option<usize>,
) -> Result<()> {
    let top_k = top_k.unwrap_or(config.top_k);
    info!(provider = %provider, top_k, "searching");

    let embedder = embedder_for(provider, config)?;
    let query_embedding = embedder.embed(query)?;

    let store = VectorStore::connect(&config.database_url).await?;
    let results = store
        .search(&provider.collection_name(), &query_embedding, top_k)
        .await?;

    if results.is_empty() {
        println!("No matches found in collection '{}'.", provider.collection_name());
        return Ok(());
    }

    println!("Top {} matches for \"{}\":\n", results.len(), query);
    for (rank, result) in results.iter().enumerate() {
        println!(
            "{:>2}. [score {:.4}] {} (chunk {}, offset {})",
            rank + 1,
            result.score,
            result.source,
            result.chunk_index,
            result.char_offset
        );
        println!("    {}\n", preview(&result.content, 200));
    }
    Ok(())
}

/// Interactive chat loop: each line is a question answered from the
/// provider's collection. `help` and `exit` are control inputs; errors are
/// reported and the loop continues.
#[inline]
pub async fn chat(config: &AppConfig, provider: Provider) -> Result<()> {
    println!("=== Chat with your documents ===");
    println!("Provider: {provider}");
    println!("Type 'exit' to quit, 'help' for instructions");
    println!("{}", "-".repeat(40));

    let embedder = embedder_for(provider, config)?;
    let model = chat_model_for(provider, config)?;
    let store = VectorStore::connect(&config.database_url).await?;
    let collection = provider.collection_name();

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let input = line?.trim().to_string();

        match input.to_lowercase().as_str() {
            "" => continue,
            "exit" => {
                println!("Leaving chat...");
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        println!("Processing...");
        match answer_question(embedder.as_ref(), model.as_ref(), &store, &collection, &input, config.top_k).await {
            Ok(answer) => println!("\nAssistant: {answer}"),
            Err(e) => {
                error!(error = %e, "failed to answer question");
                println!("\nError: {e}");
                println!("Try again, or type 'exit' to quit.");
            }
        }
    }

    Ok(())
}

async fn answer_question(
    embedder: &dyn Embedder,
    model: &dyn ChatModel,
    store: &VectorStore,
    collection: &str,
    question: &str,
    top_k: usize,
) -> Result<String> {
    let query_embedding = embedder.embed(question)?;
    let results = store.search(collection, &query_embedding, top_k).await?;
    compose_answer(model, question, &results)
}

fn print_help() {
    println!("\n=== HELP ===");
    println!("This chat answers questions based on the ingested documents.");
    println!("\nControl inputs:");
    println!("- 'exit': quit the chat");
    println!("- 'help': show this message");
    println!("\nTips:");
    println!("- Ask specific questions about the ingested content");
    println!("- Switch providers with: docchat chat --provider openai|google|huggingface");
    println!("- The assistant only answers from the ingested content;");
    println!("  if the answer is not there, it says so");
    println!("{}", "-".repeat(40));
}

/// Drop a provider's collection so the next ingestion starts clean.
#[inline]
pub async fn drop_collection(config: &AppConfig, provider: Provider) -> Result<()> {
    let collection = provider.collection_name();
    let store = VectorStore::connect(&config.database_url).await?;
    store.drop_collection(&collection).await?;
    println!("Dropped collection '{collection}'");
    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = flattened.chars().collect();
    if chars.len() <= max_chars {
        flattened
    } else {
        let mut out: String = chars[..max_chars].iter().collect();
        out.push('…');
        out
    }
}
