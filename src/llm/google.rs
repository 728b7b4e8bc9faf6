use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::GoogleConfig;
use crate::llm::ChatModel;
use crate::{RagError, Result};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Chat model backed by the Google Generative Language `generateContent` API.
#[derive(Debug, Clone)]
pub struct GoogleChatModel {
    base_url: String,
    api_key: String,
    model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

impl GoogleChatModel {
    #[inline]
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(RagError::MissingCredential {
                provider: "google",
                variable: "GOOGLE_API_KEY",
            })?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: config.llm_model.clone(),
            agent,
        })
    }

    /// Point the client at a different API root. Used by tests.
    #[inline]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn generation_error(&self, message: String) -> RagError {
        RagError::Generation {
            model: self.model.clone(),
            message,
        }
    }
}

impl ChatModel for GoogleChatModel {
    #[inline]
    fn model_name(&self) -> &str {
        &self.model
    }

    #[inline]
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| self.generation_error(format!("failed to serialize request: {e}")))?;

        debug!(model = %self.model, prompt_len = prompt.len(), "requesting content generation");

        let response_text = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| {
                error!(model = %self.model, error = %e, "content generation failed");
                self.generation_error(e.to_string())
            })?;

        let parsed: GenerateResponse = serde_json::from_str(&response_text)
            .map_err(|e| self.generation_error(format!("failed to parse response: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .ok_or_else(|| self.generation_error("API returned no candidates".to_string()))?;

        Ok(text)
    }
}
