use super::*;
use crate::config::EmbeddingConfig;
use tempfile::TempDir;

fn create_test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::load_from(temp_dir.path()).expect("should build config");
    config.embedding = EmbeddingConfig {
        dimension: 4,
        ..EmbeddingConfig::default()
    };
    (config, temp_dir)
}

fn create_test_record(id: u32, vector: Vec<f32>) -> PassageRecord {
    PassageRecord {
        id,
        vector,
        metadata: PassageMetadata {
            text: format!("Passage text {}", id),
            kanda: "Bala Kanda".to_string(),
            topic: format!("Topic {}", id),
            characters: "Rama, Sita".to_string(),
            embedding_model: "nomic-embed-text:latest".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        },
    }
}

#[tokio::test]
async fn store_initialization() {
    let (config, _temp_dir) = create_test_config();

    let result = VectorStore::new(&config).await;
    assert!(
        result.is_ok(),
        "Failed to initialize VectorStore: {:?}",
        result.err()
    );

    let store = result.expect("should get store");
    assert_eq!(store.table_name, "passages");
    assert_eq!(store.vector_dimension, 4);
}

#[tokio::test]
async fn search_on_missing_table_returns_empty() {
    let (config, _temp_dir) = create_test_config();
    let store = VectorStore::new(&config).await.expect("should create store");

    let results = store
        .search_similar(&[1.0, 0.0, 0.0, 0.0], 5)
        .await
        .expect("search should succeed");

    assert!(results.is_empty(), "Empty store must yield no results");
    assert_eq!(store.count().await.expect("count should succeed"), 0);
}

#[tokio::test]
async fn upsert_and_count() {
    let (config, _temp_dir) = create_test_config();
    let mut store = VectorStore::new(&config).await.expect("should create store");

    let records = vec![
        create_test_record(1, vec![1.0, 0.0, 0.0, 0.0]),
        create_test_record(2, vec![0.0, 1.0, 0.0, 0.0]),
        create_test_record(3, vec![0.0, 0.0, 1.0, 0.0]),
    ];

    store
        .upsert_passages(records)
        .await
        .expect("upsert should succeed");

    assert_eq!(store.count().await.expect("count should succeed"), 3);
}

#[tokio::test]
async fn upsert_is_idempotent_by_id() {
    let (config, _temp_dir) = create_test_config();
    let mut store = VectorStore::new(&config).await.expect("should create store");

    let records = vec![
        create_test_record(1, vec![1.0, 0.0, 0.0, 0.0]),
        create_test_record(2, vec![0.0, 1.0, 0.0, 0.0]),
    ];
    store
        .upsert_passages(records.clone())
        .await
        .expect("first upsert should succeed");
    store
        .upsert_passages(records)
        .await
        .expect("second upsert should succeed");

    // Same ids overwrite instead of duplicating
    assert_eq!(store.count().await.expect("count should succeed"), 2);
}

#[tokio::test]
async fn search_orders_by_similarity() {
    let (config, _temp_dir) = create_test_config();
    let mut store = VectorStore::new(&config).await.expect("should create store");

    store
        .upsert_passages(vec![
            create_test_record(1, vec![1.0, 0.0, 0.0, 0.0]),
            create_test_record(2, vec![0.7, 0.7, 0.0, 0.0]),
            create_test_record(3, vec![0.0, 0.0, 1.0, 0.0]),
        ])
        .await
        .expect("upsert should succeed");

    let results = store
        .search_similar(&[1.0, 0.0, 0.0, 0.0], 2)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 2, "Should respect the limit");
    assert_eq!(results[0].id, 1, "Exact match should rank first");
    for pair in results.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "Scores must be non-increasing"
        );
    }
}

#[tokio::test]
async fn upsert_rejects_wrong_dimension() {
    let (config, _temp_dir) = create_test_config();
    let mut store = VectorStore::new(&config).await.expect("should create store");

    let result = store
        .upsert_passages(vec![create_test_record(1, vec![1.0, 0.0])])
        .await;

    assert!(matches!(result, Err(ChatbotError::Database(_))));
}

#[tokio::test]
async fn rebuild_drops_all_rows() {
    let (config, _temp_dir) = create_test_config();
    let mut store = VectorStore::new(&config).await.expect("should create store");

    store
        .upsert_passages(vec![create_test_record(1, vec![1.0, 0.0, 0.0, 0.0])])
        .await
        .expect("upsert should succeed");
    assert_eq!(store.count().await.expect("count should succeed"), 1);

    store.rebuild().await.expect("rebuild should succeed");
    assert_eq!(store.count().await.expect("count should succeed"), 0);
}
