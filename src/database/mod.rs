// LanceDB vector database module
// Persistent storage and similarity search for passage embeddings

pub mod vector_store;

use serde::{Deserialize, Serialize};

pub use vector_store::{ScoredPassage, VectorStore};

/// Embedding record stored in LanceDB, keyed by passage id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageRecord {
    /// Corpus passage id; the upsert key
    pub id: u32,
    /// The embedding vector; length must match the table width
    pub vector: Vec<f32>,
    /// Passage text and provenance stored alongside the vector
    pub metadata: PassageMetadata,
}

/// Metadata stored alongside each passage embedding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassageMetadata {
    /// The passage text itself
    pub text: String,
    /// Book of the Ramayana the passage belongs to
    pub kanda: String,
    /// Short topic label
    pub topic: String,
    /// Characters appearing in the passage, comma-joined
    pub characters: String,
    /// Embedding model that produced the vector
    pub embedding_model: String,
    /// Timestamp when this record was written
    pub created_at: String,
}
