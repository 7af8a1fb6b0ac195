use super::*;
use crate::config::{Config, EmbeddingConfig};
use crate::database::{PassageMetadata, PassageRecord};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn embedding_config_for(server: &MockServer) -> EmbeddingConfig {
    let url = url::Url::parse(&server.uri()).expect("mock server uri should parse");
    EmbeddingConfig {
        host: url.host_str().expect("mock host").to_string(),
        port: url.port().expect("mock port"),
        dimension: 4,
        ..EmbeddingConfig::default()
    }
}

async fn store_with_passages(config: &Config, records: Vec<PassageRecord>) -> VectorStore {
    let mut store = VectorStore::new(config).await.expect("should create store");
    if !records.is_empty() {
        store
            .upsert_passages(records)
            .await
            .expect("upsert should succeed");
    }
    store
}

fn record(id: u32, text: &str, vector: Vec<f32>) -> PassageRecord {
    PassageRecord {
        id,
        vector,
        metadata: PassageMetadata {
            text: text.to_string(),
            kanda: "Bala Kanda".to_string(),
            topic: "Test".to_string(),
            characters: "Rama".to_string(),
            embedding_model: "nomic-embed-text:latest".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        },
    }
}

#[tokio::test]
async fn top_k_is_clamped_to_at_least_one() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::load_from(temp_dir.path()).expect("should build config");

    let store = VectorStore::new(&config).await.expect("should create store");
    let embedder = OllamaClient::new(&config.embedding).expect("should create client");

    let retriever = Retriever::new(store, embedder, 0);
    assert_eq!(retriever.top_k(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn retrieves_nearest_passage_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"embedding": [1.0, 0.0, 0.0, 0.0]})),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::load_from(temp_dir.path()).expect("should build config");
    config.embedding = embedding_config_for(&server);

    let store = store_with_passages(
        &config,
        vec![
            record(1, "Rama is the prince of Ayodhya.", vec![1.0, 0.0, 0.0, 0.0]),
            record(2, "Hanuman leapt to Lanka.", vec![0.0, 1.0, 0.0, 0.0]),
        ],
    )
    .await;

    let embedder = OllamaClient::new(&config.embedding).expect("should create client");
    let retriever = Retriever::new(store, embedder, 1);

    let results = retriever
        .retrieve("Who is Rama?")
        .await
        .expect("retrieve should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, 1);
    assert_eq!(results[0].metadata.text, "Rama is the prince of Ayodhya.");
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_collection_yields_empty_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"embedding": [0.5, 0.5, 0.0, 0.0]})),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::load_from(temp_dir.path()).expect("should build config");
    config.embedding = embedding_config_for(&server);

    let store = store_with_passages(&config, Vec::new()).await;
    let embedder = OllamaClient::new(&config.embedding).expect("should create client");
    let retriever = Retriever::new(store, embedder, 3);

    let results = retriever
        .retrieve("Anything at all")
        .await
        .expect("retrieve should succeed on an empty store");

    assert!(results.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn returns_at_most_k_ordered_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"embedding": [1.0, 0.1, 0.0, 0.0]})),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::load_from(temp_dir.path()).expect("should build config");
    config.embedding = embedding_config_for(&server);

    let store = store_with_passages(
        &config,
        vec![
            record(1, "one", vec![1.0, 0.0, 0.0, 0.0]),
            record(2, "two", vec![0.9, 0.3, 0.0, 0.0]),
            record(3, "three", vec![0.0, 0.0, 1.0, 0.0]),
            record(4, "four", vec![0.0, 0.0, 0.0, 1.0]),
        ],
    )
    .await;

    let embedder = OllamaClient::new(&config.embedding).expect("should create client");
    let retriever = Retriever::new(store, embedder, 2);

    let results = retriever
        .retrieve("query")
        .await
        .expect("retrieve should succeed");

    assert!(results.len() <= 2);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}
