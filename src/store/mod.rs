#[cfg(test)]
mod tests;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use crate::chunking::DocumentChunk;
use crate::{RagError, Result};

const MAX_CONNECTIONS: u32 = 5;

/// A chunk returned from nearest-neighbor search, with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub content: String,
    pub source: String,
    pub chunk_index: i32,
    pub char_offset: i32,
    /// Cosine similarity: 1 − cosine distance, higher is more similar.
    pub score: f32,
}

/// PostgreSQL + pgvector vector store.
///
/// Each collection is a table named `documents_<provider>` whose `embedding`
/// column is typed `vector(D)`; pgvector enforces that every row in one
/// collection shares dimensionality D.
#[derive(Debug, Clone)]
pub struct VectorStore {
    pool: PgPool,
}

impl VectorStore {
    /// Connect to the database behind the given URL.
    #[inline]
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| RagError::Database(format!("failed to connect: {e}")))?;

        debug!("connected to vector store");
        Ok(Self { pool })
    }

    /// Build a store from an existing pool. Used by tests.
    #[inline]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a collection for vectors of the given dimensionality, along
    /// with the pgvector extension, if either is missing.
    #[inline]
    pub async fn create_collection(&self, collection: &str, dimensions: usize) -> Result<()> {
        let table = table_name(collection)?;

        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(|e| RagError::StoreWrite(format!("failed to create extension: {e}")))?;

        let create_sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
                id TEXT PRIMARY KEY, \
                content TEXT NOT NULL, \
                embedding vector({dimensions}) NOT NULL, \
                source TEXT NOT NULL, \
                chunk_index INTEGER NOT NULL, \
                char_offset INTEGER NOT NULL, \
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()\
            )"
        );
        sqlx::query(&create_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| RagError::StoreWrite(format!("failed to create collection: {e}")))?;

        debug!(collection, dimensions, "collection ready");
        Ok(())
    }

    /// Drop a collection and everything in it.
    #[inline]
    pub async fn drop_collection(&self, collection: &str) -> Result<()> {
        let table = table_name(collection)?;
        let drop_sql = format!("DROP TABLE IF EXISTS {table}");
        sqlx::query(&drop_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| RagError::Database(format!("failed to drop collection: {e}")))?;

        info!(collection, "dropped collection");
        Ok(())
    }

    /// Insert chunks with their embeddings in a single transaction.
    ///
    /// Inserting never replaces existing rows; re-ingesting a document
    /// appends. On any failure the whole write is rolled back.
    #[inline]
    pub async fn insert_chunks(
        &self,
        collection: &str,
        chunks: &[DocumentChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::StoreWrite(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Ok(());
        }

        let table = table_name(collection)?;
        let insert_sql = format!(
            "INSERT INTO {table} (id, content, embedding, source, chunk_index, char_offset) \
             VALUES ($1, $2, $3::vector, $4, $5, $6)"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RagError::StoreWrite(format!("failed to begin transaction: {e}")))?;

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            sqlx::query(&insert_sql)
                .bind(&chunk.id)
                .bind(&chunk.content)
                .bind(vector_literal(embedding))
                .bind(&chunk.source)
                .bind(i32::try_from(chunk.chunk_index).unwrap_or(i32::MAX))
                .bind(i32::try_from(chunk.char_offset).unwrap_or(i32::MAX))
                .execute(&mut *tx)
                .await
                .map_err(|e| RagError::StoreWrite(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RagError::StoreWrite(format!("failed to commit: {e}")))?;

        info!(collection, count = chunks.len(), "stored chunks");
        Ok(())
    }

    /// The dimensionality of a collection's `embedding` column, or `None`
    /// when the collection does not exist.
    #[inline]
    pub async fn collection_dimension(&self, collection: &str) -> Result<Option<usize>> {
        let table = table_name(collection)?;
        let row = sqlx::query(
            "SELECT a.atttypmod AS dimension \
             FROM pg_attribute a \
             JOIN pg_class c ON a.attrelid = c.oid \
             JOIN pg_namespace n ON c.relnamespace = n.oid \
             WHERE c.relname = $1 \
               AND n.nspname = current_schema() \
               AND a.attname = 'embedding'",
        )
        .bind(&table)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RagError::Database(format!("failed to inspect collection: {e}")))?;

        // pgvector stores the declared dimension in atttypmod.
        Ok(row.and_then(|r| {
            let dimension: i32 = r.get("dimension");
            usize::try_from(dimension).ok()
        }))
    }

    /// Return the `top_k` nearest chunks by cosine distance, most similar
    /// first.
    ///
    /// Fails with [`RagError::CollectionNotFound`] when the collection was
    /// never populated and [`RagError::DimensionMismatch`] when the query
    /// vector's dimensionality disagrees with the collection's.
    #[inline]
    pub async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let stored = self
            .collection_dimension(collection)
            .await?
            .ok_or_else(|| RagError::CollectionNotFound(collection.to_string()))?;
        if stored != embedding.len() {
            return Err(RagError::DimensionMismatch {
                stored,
                query: embedding.len(),
            });
        }

        let table = table_name(collection)?;
        let search_sql = format!(
            "SELECT content, source, chunk_index, char_offset, \
                    1 - (embedding <=> $1::vector) AS score \
             FROM {table} \
             ORDER BY embedding <=> $1::vector \
             LIMIT $2"
        );

        let rows = sqlx::query(&search_sql)
            .bind(vector_literal(embedding))
            .bind(i64::try_from(top_k).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RagError::Database(format!("search failed: {e}")))?;

        let results = rows
            .iter()
            .map(|row| {
                let score: f64 = row.get("score");
                SearchResult {
                    content: row.get("content"),
                    source: row.get("source"),
                    chunk_index: row.get("chunk_index"),
                    char_offset: row.get("char_offset"),
                    score: score as f32,
                }
            })
            .collect();

        debug!(collection, top_k, "search completed");
        Ok(results)
    }
}

/// Validate a collection name for use as a table name. Only lowercase
/// alphanumerics and underscores are accepted; names are interpolated into
/// SQL and must never carry anything else.
fn table_name(collection: &str) -> Result<String> {
    if collection.is_empty()
        || !collection
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(RagError::Database(format!(
            "invalid collection name: '{collection}'"
        )));
    }
    Ok(collection.to_string())
}

/// Encode a vector as the pgvector text literal `[v1,v2,...]`.
fn vector_literal(embedding: &[f32]) -> String {
    let mut literal = String::with_capacity(embedding.len() * 8 + 2);
    literal.push('[');
    for (i, value) in embedding.iter().enumerate() {
        if i > 0 {
            literal.push(',');
        }
        literal.push_str(&value.to_string());
    }
    literal.push(']');
    literal
}
