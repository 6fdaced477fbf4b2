// LanceDB-backed persistent vector store.
// Holds chunk text, source metadata, and embeddings for similarity search.

pub mod vector_store;

use serde::{Deserialize, Serialize};

pub use vector_store::{SearchResult, VectorStore};

/// Embedding record persisted in the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Unique identifier for this embedding
    pub id: String,
    /// The vector embedding
    pub vector: Vec<f32>,
    /// Metadata about the chunk this embedding represents
    pub metadata: ChunkRecord,
}

/// Chunk data stored alongside its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Identity of the source file the chunk came from
    pub source: String,
    /// The chunk text
    pub content: String,
    /// Index of this chunk within the source document (for ordering)
    pub chunk_index: u32,
    /// Timestamp when this embedding was created
    pub created_at: String,
}
