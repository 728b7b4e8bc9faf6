use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::OpenAiConfig;
use crate::provider::Embedder;
use crate::{RagError, Result};

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Dimensionality of `text-embedding-3-small` vectors.
pub const EMBEDDING_DIMENSION: usize = 1536;

/// Embedding function backed by the OpenAI embeddings API.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    #[inline]
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(RagError::MissingCredential {
                provider: PROVIDER,
                variable: "OPENAI_API_KEY",
            })?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: config.embedding_model.clone(),
            agent,
        })
    }

    /// Point the client at a different API root. Used by tests.
    #[inline]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };
        let body = serde_json::to_string(&request).map_err(|e| RagError::Embedding {
            provider: PROVIDER,
            message: format!("failed to serialize request: {e}"),
        })?;

        debug!(model = %self.model, batch = texts.len(), "requesting OpenAI embeddings");

        let response_text = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "embedding request failed");
                RagError::Embedding {
                    provider: PROVIDER,
                    message: e.to_string(),
                }
            })?;

        let parsed: EmbedResponse =
            serde_json::from_str(&response_text).map_err(|e| RagError::Embedding {
                provider: PROVIDER,
                message: format!("failed to parse response: {e}"),
            })?;

        if parsed.data.len() != texts.len() {
            return Err(RagError::Embedding {
                provider: PROVIDER,
                message: format!(
                    "requested {} embeddings but received {}",
                    texts.len(),
                    parsed.data.len()
                ),
            });
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request_embeddings(&[text.to_string()])?;
        vectors.pop().ok_or_else(|| RagError::Embedding {
            provider: PROVIDER,
            message: "API returned an empty response".to_string(),
        })
    }

    #[inline]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts)
    }

    #[inline]
    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}
