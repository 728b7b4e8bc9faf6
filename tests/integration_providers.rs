#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// HTTP-level tests for the remote embedding clients, backed by wiremock.
// The clients are blocking (ureq), so calls are moved off the async runtime
// with spawn_blocking.

use docchat::RagError;
use docchat::config::{GoogleConfig, OpenAiConfig};
use docchat::provider::google::GoogleEmbedder;
use docchat::provider::openai::OpenAiEmbedder;
use docchat::provider::Embedder;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_config() -> OpenAiConfig {
    OpenAiConfig {
        api_key: Some("test-key".to_string()),
        ..OpenAiConfig::default()
    }
}

fn google_config() -> GoogleConfig {
    GoogleConfig {
        api_key: Some("test-key".to_string()),
        embedding_dimension: 4,
        ..GoogleConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn openai_embeds_a_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "text-embedding-3-small",
            "input": ["first", "second"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "embedding": [0.1, 0.2] },
                { "embedding": [0.3, 0.4] },
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(&openai_config())
        .expect("key is configured")
        .with_base_url(server.uri());

    let vectors = tokio::task::spawn_blocking(move || {
        embedder.embed_batch(&["first".to_string(), "second".to_string()])
    })
    .await
    .expect("task should not panic")
    .expect("embedding should succeed");

    assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
}

#[tokio::test(flavor = "multi_thread")]
async fn openai_single_embed_unwraps_first_vector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "embedding": [1.0, 2.0, 3.0] } ]
        })))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(&openai_config())
        .expect("key is configured")
        .with_base_url(server.uri());

    let vector = tokio::task::spawn_blocking(move || embedder.embed("hello"))
        .await
        .expect("task should not panic")
        .expect("embedding should succeed");

    assert_eq!(vector, vec![1.0, 2.0, 3.0]);
}

#[tokio::test(flavor = "multi_thread")]
async fn openai_surfaces_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(&openai_config())
        .expect("key is configured")
        .with_base_url(server.uri());

    let err = tokio::task::spawn_blocking(move || embedder.embed("hello"))
        .await
        .expect("task should not panic")
        .expect_err("a 500 must fail the embedding");

    assert!(matches!(err, RagError::Embedding { provider: "openai", .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn openai_rejects_count_mismatch() {
    let server = MockServer::start().await;

    // Two inputs, one embedding back.
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "embedding": [0.5] } ]
        })))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(&openai_config())
        .expect("key is configured")
        .with_base_url(server.uri());

    let err = tokio::task::spawn_blocking(move || {
        embedder.embed_batch(&["a".to_string(), "b".to_string()])
    })
    .await
    .expect("task should not panic")
    .expect_err("mismatched counts must fail");

    assert!(matches!(err, RagError::Embedding { provider: "openai", .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn google_embeds_a_single_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-embedding-001:embedContent"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "model": "models/gemini-embedding-001",
            "outputDimensionality": 4,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": { "values": [0.1, 0.2, 0.3, 0.4] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = GoogleEmbedder::new(&google_config())
        .expect("key is configured")
        .with_base_url(server.uri());

    let vector = tokio::task::spawn_blocking(move || embedder.embed("hello"))
        .await
        .expect("task should not panic")
        .expect("embedding should succeed");

    assert_eq!(vector, vec![0.1, 0.2, 0.3, 0.4]);
}

#[tokio::test(flavor = "multi_thread")]
async fn google_embeds_a_batch_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-embedding-001:batchEmbedContents"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [
                { "values": [1.0, 0.0] },
                { "values": [0.0, 1.0] },
            ]
        })))
        .mount(&server)
        .await;

    let embedder = GoogleEmbedder::new(&google_config())
        .expect("key is configured")
        .with_base_url(server.uri());

    let vectors = tokio::task::spawn_blocking(move || {
        embedder.embed_batch(&["first".to_string(), "second".to_string()])
    })
    .await
    .expect("task should not panic")
    .expect("embedding should succeed");

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test(flavor = "multi_thread")]
async fn google_surfaces_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-embedding-001:embedContent"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let embedder = GoogleEmbedder::new(&google_config())
        .expect("key is configured")
        .with_base_url(server.uri());

    let err = tokio::task::spawn_blocking(move || embedder.embed("hello"))
        .await
        .expect("task should not panic")
        .expect_err("a 403 must fail the embedding");

    assert!(matches!(err, RagError::Embedding { provider: "google", .. }));
}
