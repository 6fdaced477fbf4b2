use super::*;
use crate::config::OllamaConfig;
use crate::splitter::ChunkingConfig;
use std::path::PathBuf;

fn test_config(ollama: OllamaConfig) -> Config {
    Config {
        ollama,
        chunking: ChunkingConfig::default(),
        base_dir: PathBuf::new(),
    }
}

#[test]
fn client_configuration() {
    let config = test_config(OllamaConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        model: "test-model".to_string(),
        batch_size: 128,
        embedding_dimension: 768,
    });
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model, "test-model");
    assert_eq!(client.batch_size, 128);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn client_builder_methods() {
    let config = test_config(OllamaConfig::default());
    let client = OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5);

    assert_eq!(client.retry_attempts, 5);
}

#[test]
fn embed_empty_batch() {
    let config = test_config(OllamaConfig::default());
    let client = OllamaClient::new(&config).expect("Failed to create client");

    let results = client
        .embed_batch(&[])
        .expect("empty batch should not contact the server");
    assert!(results.is_empty());

    let results = client
        .embed_chunks(&[])
        .expect("empty chunk list should not contact the server");
    assert!(results.is_empty());
}

#[test]
fn embedding_result_structure() {
    let result = EmbeddingResult {
        text: "test text".to_string(),
        embedding: vec![0.1, 0.2, 0.3, 0.4, 0.5],
    };

    assert_eq!(result.text, "test text");
    assert_eq!(result.embedding.len(), 5);
}
