use std::collections::HashSet;
use std::str::FromStr;

use crate::RagError;
use crate::config::{AppConfig, GoogleConfig, OpenAiConfig};
use crate::provider::{Provider, embedder_for, google::GoogleEmbedder, openai::OpenAiEmbedder};

#[test]
fn parses_known_providers() {
    assert_eq!(
        Provider::from_str("huggingface").unwrap(),
        Provider::Huggingface
    );
    assert_eq!(Provider::from_str("openai").unwrap(), Provider::Openai);
    assert_eq!(Provider::from_str("google").unwrap(), Provider::Google);
}

#[test]
fn parsing_is_case_insensitive_and_trims() {
    assert_eq!(Provider::from_str(" OpenAI ").unwrap(), Provider::Openai);
    assert_eq!(Provider::from_str("GOOGLE").unwrap(), Provider::Google);
}

#[test]
fn unknown_provider_is_rejected() {
    let err = Provider::from_str("azure").unwrap_err();
    assert!(matches!(err, RagError::UnknownProvider(ref id) if id == "azure"));
}

#[test]
fn collection_names_are_injective() {
    let names: HashSet<String> = Provider::ALL.iter().map(|p| p.collection_name()).collect();
    assert_eq!(names.len(), Provider::ALL.len());
    assert!(names.contains("documents_huggingface"));
    assert!(names.contains("documents_openai"));
    assert!(names.contains("documents_google"));
}

#[test]
fn dimensions_per_provider() {
    let config = AppConfig::default();
    assert_eq!(Provider::Huggingface.dimensions(&config), 384);
    assert_eq!(Provider::Openai.dimensions(&config), 1536);
    assert_eq!(Provider::Google.dimensions(&config), 3072);
}

#[test]
fn openai_embedder_requires_api_key() {
    let err = OpenAiEmbedder::new(&OpenAiConfig::default()).err().unwrap();
    assert!(matches!(
        err,
        RagError::MissingCredential {
            provider: "openai",
            variable: "OPENAI_API_KEY"
        }
    ));
}

#[test]
fn google_embedder_requires_api_key() {
    let err = GoogleEmbedder::new(&GoogleConfig::default()).err().unwrap();
    assert!(matches!(
        err,
        RagError::MissingCredential {
            provider: "google",
            variable: "GOOGLE_API_KEY"
        }
    ));
}

#[test]
fn remote_factories_fail_without_credentials() {
    // No API keys configured: the factory must fail before any network call.
    let config = AppConfig::default();
    assert!(matches!(
        embedder_for(Provider::Openai, &config),
        Err(RagError::MissingCredential { .. })
    ));
    assert!(matches!(
        embedder_for(Provider::Google, &config),
        Err(RagError::MissingCredential { .. })
    ));
}
