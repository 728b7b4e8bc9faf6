use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::OpenAiConfig;
use crate::llm::ChatModel;
use crate::{RagError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Chat model backed by the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    base_url: String,
    api_key: String,
    model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiChatModel {
    #[inline]
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(RagError::MissingCredential {
                provider: "openai",
                variable: "OPENAI_API_KEY",
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

impl ChatModel for OpenAiChatModel {
    #[inline]
    fn model_name(&self) -> &str {
        &self.model
    }

    #[inline]
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| self.generation_error(format!("failed to serialize request: {e}")))?;

        debug!(model = %self.model, prompt_len = prompt.len(), "requesting chat completion");

        let response_text = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| {
                error!(model = %self.model, error = %e, "chat completion failed");
                self.generation_error(e.to_string())
            })?;

        let parsed: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| self.generation_error(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| self.generation_error("API returned no choices".to_string()))
    }
}
