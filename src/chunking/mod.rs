
use tracing::debug;
use uuid::Uuid;

use crate::document::SourceDocument;

/// Fixed sliding-window size in characters.
pub const CHUNK_SIZE: usize = 1000;
/// Fixed overlap between consecutive chunks in characters.
pub const CHUNK_OVERLAP: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between a chunk and its successor.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            overlap: CHUNK_OVERLAP,
        }
    }
}

/// A contiguous substring of a source document, immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    /// Storage key. Fresh per ingestion run, so re-ingesting appends rather
    /// than replaces.
    pub id: String,
    pub content: String,
    /// Identifier of the source document.
    pub source: String,
    /// Position of this chunk within the document.
    pub chunk_index: usize,
    /// Character offset of the chunk start within the source text.
    pub char_offset: usize,
}

/// Split a document into overlapping fixed-size chunks.
///
/// The window slides forward by `chunk_size - overlap` characters, so every
/// chunk except possibly the last is exactly `chunk_size` characters long and
/// shares exactly `overlap` characters with its successor. Offsets and sizes
/// are counted in `char`s, never bytes, so multi-byte text cannot split a
/// code point.
#[inline]
pub fn split_document(document: &SourceDocument, config: &ChunkingConfig) -> Vec<DocumentChunk> {
    if document.text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = document.text.chars().collect();
    let step = config.chunk_size.saturating_sub(config.overlap);

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chunk_index = 0;

    loop {
        let end = (start + config.chunk_size).min(chars.len());
        chunks.push(DocumentChunk {
            id: Uuid::new_v4().to_string(),
            content: chars[start..end].iter().collect(),
            source: document.id.clone(),
            chunk_index,
            char_offset: start,
        });
        chunk_index += 1;

        if end == chars.len() || step == 0 {
            break;
        }
        start += step;
    }

    debug!(
        document = %document.id,
        chunks = chunks.len(),
        chunk_size = config.chunk_size,
        overlap = config.overlap,
        "split document"
    );

    chunks
}
