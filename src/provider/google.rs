use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::GoogleConfig;
use crate::provider::Embedder;
use crate::{RagError, Result};

const PROVIDER: &str = "google";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Embedding function backed by the Google Generative Language API
/// (`gemini-embedding-001` by default).
#[derive(Debug, Clone)]
pub struct GoogleEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ContentPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
    output_dimensionality: usize,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

impl GoogleEmbedder {
    #[inline]
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(RagError::MissingCredential {
                provider: PROVIDER,
                variable: "GOOGLE_API_KEY",
            })?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dimension,
            agent,
        })
    }

    /// Point the client at a different API root. Used by tests.
    #[inline]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn embed_request<'a>(&self, text: &'a str) -> EmbedContentRequest<'a> {
        EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: vec![ContentPart { text }],
            },
            output_dimensionality: self.dimensions,
        }
    }

    fn post_json(&self, url: &str, body: &str) -> Result<String> {
        self.agent
            .post(url)
            .header("Content-Type", "application/json")
            .send(body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "embedding request failed");
                RagError::Embedding {
                    provider: PROVIDER,
                    message: e.to_string(),
                }
            })
    }
}

impl Embedder for GoogleEmbedder {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!(
            "{}/models/{}:embedContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body =
            serde_json::to_string(&self.embed_request(text)).map_err(|e| RagError::Embedding {
                provider: PROVIDER,
                message: format!("failed to serialize request: {e}"),
            })?;

        debug!(model = %self.model, "requesting Google embedding");

        let response_text = self.post_json(&url, &body)?;
        let parsed: EmbedContentResponse =
            serde_json::from_str(&response_text).map_err(|e| RagError::Embedding {
                provider: PROVIDER,
                message: format!("failed to parse response: {e}"),
            })?;

        Ok(parsed.embedding.values)
    }

    #[inline]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/models/{}:batchEmbedContents?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = BatchEmbedRequest {
            requests: texts.iter().map(|t| self.embed_request(t)).collect(),
        };
        let body = serde_json::to_string(&request).map_err(|e| RagError::Embedding {
            provider: PROVIDER,
            message: format!("failed to serialize request: {e}"),
        })?;

        debug!(model = %self.model, batch = texts.len(), "requesting Google embeddings");

        let response_text = self.post_json(&url, &body)?;
        let parsed: BatchEmbedResponse =
            serde_json::from_str(&response_text).map_err(|e| RagError::Embedding {
                provider: PROVIDER,
                message: format!("failed to parse response: {e}"),
            })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(RagError::Embedding {
                provider: PROVIDER,
                message: format!(
                    "requested {} embeddings but received {}",
                    texts.len(),
                    parsed.embeddings.len()
                ),
            });
        }

        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    #[inline]
    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
