use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::{debug, info, warn};

use crate::config::HuggingfaceConfig;
use crate::provider::Embedder;
use crate::{RagError, Result};

const PROVIDER: &str = "huggingface";
const BUNDLED_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Dimensionality of `all-MiniLM-L6-v2` vectors.
pub const EMBEDDING_DIMENSION: usize = 384;

/// Local embedding function running the ONNX export of
/// `sentence-transformers/all-MiniLM-L6-v2` via fastembed. No credential is
/// required; the model is fetched into the local cache on first use.
pub struct HuggingfaceEmbedder {
    model: TextEmbedding,
}

impl HuggingfaceEmbedder {
    #[inline]
    pub fn new(config: &HuggingfaceConfig) -> Result<Self> {
        if config.model != BUNDLED_MODEL {
            warn!(
                requested = %config.model,
                "only {BUNDLED_MODEL} is available locally; using it"
            );
        }

        info!("loading local embedding model {BUNDLED_MODEL}");
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| RagError::Embedding {
            provider: PROVIDER,
            message: format!("failed to load local model: {e}"),
        })?;

        Ok(Self { model })
    }
}

impl Embedder for HuggingfaceEmbedder {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        vectors.pop().ok_or_else(|| RagError::Embedding {
            provider: PROVIDER,
            message: "model returned no embedding".to_string(),
        })
    }

    #[inline]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(batch = texts.len(), "embedding locally");
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| RagError::Embedding {
                provider: PROVIDER,
                message: e.to_string(),
            })
    }

    #[inline]
    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}
