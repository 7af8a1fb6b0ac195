// Retriever module
// Embeds a query and pulls the top-k nearest passages from the store

#[cfg(test)]
mod tests;

use tracing::{debug, warn};

use crate::Result;
use crate::database::{ScoredPassage, VectorStore};
use crate::embeddings::OllamaClient;

/// Top-k passage retriever over the vector store. Holds the store and the
/// embedding client for the lifetime of the process.
pub struct Retriever {
    store: VectorStore,
    embedder: OllamaClient,
    top_k: usize,
}

impl Retriever {
    #[inline]
    pub fn new(store: VectorStore, embedder: OllamaClient, top_k: usize) -> Self {
        Self {
            store,
            embedder,
            // k is a small constant; zero would silently disable retrieval
            top_k: top_k.max(1),
        }
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    #[inline]
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Retrieve up to `top_k` passages most similar to the query, ordered
    /// descending by score. An empty collection yields an empty Vec, which
    /// callers treat as "no context available" rather than an error.
    #[inline]
    pub async fn retrieve(&self, query_en: &str) -> Result<Vec<ScoredPassage>> {
        debug!("Retrieving passages for query (length: {})", query_en.len());

        let query_vector = self.embedder.embed(query_en)?;
        let results = self.store.search_similar(&query_vector, self.top_k).await?;

        if results.is_empty() {
            warn!("No passages retrieved; answering without corpus context");
        } else {
            debug!(
                "Retrieved {} passages, top score {:.3}",
                results.len(),
                results[0].score
            );
        }

        Ok(results)
    }
}
