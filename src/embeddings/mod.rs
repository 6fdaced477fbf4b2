// Embedding generation via an external model server.
//
// The client is constructed from the shared Config on both the ingestion and
// the query path, so both sides are guaranteed to use the same model.

pub mod ollama;

pub use ollama::{EmbeddingResult, OllamaClient};
