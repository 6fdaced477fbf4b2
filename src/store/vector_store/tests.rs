use super::*;
use crate::config::{Config, OllamaConfig};
use crate::splitter::ChunkingConfig;
use tempfile::TempDir;

fn create_test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config {
        ollama: OllamaConfig {
            embedding_dimension: 5,
            ..OllamaConfig::default()
        },
        chunking: ChunkingConfig::default(),
        base_dir: temp_dir.path().to_path_buf(),
    };
    (config, temp_dir)
}

fn record(id: &str, vector: Vec<f32>, content: &str) -> EmbeddingRecord {
    EmbeddingRecord {
        id: id.to_string(),
        vector,
        metadata: ChunkRecord {
            source: "docs.txt".to_string(),
            content: content.to_string(),
            chunk_index: 0,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        },
    }
}

#[tokio::test]
async fn store_initialization() {
    let (config, _temp_dir) = create_test_config();

    let store = VectorStore::new(&config)
        .await
        .expect("should initialize vector store");

    assert_eq!(store.table_name, TABLE_NAME);
    assert_eq!(store.vector_dimension, Some(5));
    assert_eq!(store.count().await.expect("should count"), 0);
}

#[tokio::test]
async fn store_and_count() {
    let (config, _temp_dir) = create_test_config();
    let mut store = VectorStore::new(&config)
        .await
        .expect("should create vector store");

    let records = vec![
        record("1", vec![1.0, 0.0, 0.0, 0.0, 0.0], "first chunk"),
        record("2", vec![0.0, 1.0, 0.0, 0.0, 0.0], "second chunk"),
    ];
    store
        .store_batch(records)
        .await
        .expect("should store batch");

    assert_eq!(store.count().await.expect("should count"), 2);
}

#[tokio::test]
async fn search_orders_by_similarity_and_respects_limit() {
    let (config, _temp_dir) = create_test_config();
    let mut store = VectorStore::new(&config)
        .await
        .expect("should create vector store");

    let records = vec![
        record("1", vec![1.0, 0.0, 0.0, 0.0, 0.0], "exact match"),
        record("2", vec![0.9, 0.1, 0.0, 0.0, 0.0], "near match"),
        record("3", vec![0.0, 1.0, 0.0, 0.0, 0.0], "far away"),
        record("4", vec![0.0, 0.0, 1.0, 0.0, 0.0], "also far away"),
    ];
    store
        .store_batch(records)
        .await
        .expect("should store batch");

    let results = store
        .search(&[1.0, 0.0, 0.0, 0.0, 0.0], 3)
        .await
        .expect("should search");

    assert!(results.len() <= 3);
    assert_eq!(results[0].chunk.content, "exact match");
    for pair in results.windows(2) {
        assert!(pair[0].similarity_score >= pair[1].similarity_score);
    }
}

#[tokio::test]
async fn search_empty_store_returns_no_results() {
    let (config, _temp_dir) = create_test_config();
    let store = VectorStore::new(&config)
        .await
        .expect("should create vector store");

    let results = store
        .search(&[1.0, 0.0, 0.0, 0.0, 0.0], 5)
        .await
        .expect("searching an empty store should not fail");
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_missing_table_returns_no_results() {
    let (config, _temp_dir) = create_test_config();
    let store = VectorStore::new(&config)
        .await
        .expect("should create vector store");

    store
        .drop_table_if_exists()
        .await
        .expect("should drop table");

    let results = store
        .search(&[1.0, 0.0, 0.0, 0.0, 0.0], 5)
        .await
        .expect("searching without a table should not fail");
    assert!(results.is_empty());
}

#[tokio::test]
async fn reset_clears_stored_chunks() {
    let (config, _temp_dir) = create_test_config();
    let mut store = VectorStore::new(&config)
        .await
        .expect("should create vector store");

    store
        .store_batch(vec![record(
            "1",
            vec![1.0, 0.0, 0.0, 0.0, 0.0],
            "stale chunk",
        )])
        .await
        .expect("should store batch");
    assert_eq!(store.count().await.expect("should count"), 1);

    store.reset().await.expect("should reset store");
    assert_eq!(store.count().await.expect("should count"), 0);
}

#[tokio::test]
async fn dimension_change_recreates_table() {
    let (config, _temp_dir) = create_test_config();
    let mut store = VectorStore::new(&config)
        .await
        .expect("should create vector store");

    store
        .store_batch(vec![record(
            "1",
            vec![1.0, 0.0, 0.0, 0.0, 0.0],
            "five dims",
        )])
        .await
        .expect("should store 5-dim batch");

    store
        .store_batch(vec![record("2", vec![0.5; 8], "eight dims")])
        .await
        .expect("should store 8-dim batch");

    assert_eq!(store.vector_dimension, Some(8));
    assert_eq!(store.count().await.expect("should count"), 1);
}
