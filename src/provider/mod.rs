#[cfg(test)]
mod tests;

pub mod google;
pub mod huggingface;
pub mod openai;

use std::fmt;
use std::str::FromStr;

use crate::config::AppConfig;
use crate::{RagError, Result};

/// The supported embedding providers.
///
/// Provider selection is a closed set so that an unrecognized identifier is
/// rejected at parse time, before any network or store call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Huggingface,
    Openai,
    Google,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Huggingface, Provider::Openai, Provider::Google];

    /// The canonical lowercase identifier for this provider.
    #[inline]
    pub fn id(self) -> &'static str {
        match self {
            Provider::Huggingface => "huggingface",
            Provider::Openai => "openai",
            Provider::Google => "google",
        }
    }

    /// The storage collection backing this provider.
    ///
    /// Injective over providers: vectors of differing dimensionality never
    /// share a collection.
    #[inline]
    pub fn collection_name(self) -> String {
        format!("documents_{}", self.id())
    }

    /// The dimensionality of vectors produced by this provider's embedding
    /// model.
    #[inline]
    pub fn dimensions(self, config: &AppConfig) -> usize {
        match self {
            Provider::Huggingface => huggingface::EMBEDDING_DIMENSION,
            Provider::Openai => openai::EMBEDDING_DIMENSION,
            Provider::Google => config.google.embedding_dimension,
        }
    }
}

impl fmt::Display for Provider {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = RagError;

    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" => Ok(Provider::Huggingface),
            "openai" => Ok(Provider::Openai),
            "google" => Ok(Provider::Google),
            other => Err(RagError::UnknownProvider(other.to_string())),
        }
    }
}

/// A text embedding function with a fixed output dimensionality.
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, preserving order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The dimensionality of every vector this embedder produces.
    fn dimensions(&self) -> usize;
}

/// Construct the embedding function for a provider.
///
/// Remote providers require their API key to be configured and fail with
/// [`RagError::MissingCredential`] before any network call. The HuggingFace
/// provider runs locally and needs no credential.
#[inline]
pub fn embedder_for(provider: Provider, config: &AppConfig) -> Result<Box<dyn Embedder>> {
    match provider {
        Provider::Huggingface => Ok(Box::new(huggingface::HuggingfaceEmbedder::new(
            &config.huggingface,
        )?)),
        Provider::Openai => Ok(Box::new(openai::OpenAiEmbedder::new(&config.openai)?)),
        Provider::Google => Ok(Box::new(google::GoogleEmbedder::new(&config.google)?)),
    }
}
