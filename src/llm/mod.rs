pub mod google;
pub mod openai;

use crate::config::AppConfig;
use crate::provider::Provider;
use crate::Result;

/// A chat language model invoked once per question, no conversation state.
pub trait ChatModel: Send + Sync {
    /// The model identifier, used in error reporting.
    fn model_name(&self) -> &str;

    /// Submit a prompt and return the model's text response verbatim.
    /// Failures surface as [`crate::RagError::Generation`]; there is no retry.
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Select the chat model paired with an embedding provider.
///
/// OpenAI and Google each ship their own chat model. HuggingFace only
/// provides embeddings, so questions asked under it are answered by the
/// OpenAI chat model (which then requires `OPENAI_API_KEY`).
#[inline]
pub fn chat_model_for(provider: Provider, config: &AppConfig) -> Result<Box<dyn ChatModel>> {
    match provider {
        Provider::Openai | Provider::Huggingface => {
            Ok(Box::new(openai::OpenAiChatModel::new(&config.openai)?))
        }
        Provider::Google => Ok(Box::new(google::GoogleChatModel::new(&config.google)?)),
    }
}
