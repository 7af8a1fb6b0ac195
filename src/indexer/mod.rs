// Indexer module
// One-time, operator-triggered ingestion of the corpus into the vector store


use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use crate::config::Config;
use crate::corpus::{self, Passage};
use crate::database::{PassageMetadata, PassageRecord, VectorStore};
use crate::embeddings::OllamaClient;
use crate::{ChatbotError, Result};

/// Outcome of a seed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedStats {
    pub passages: usize,
    pub dimension: usize,
    pub model: String,
}

/// Seeds the vector store from the passage corpus. Runs offline before any
/// chat traffic; a failure anywhere aborts the run with no repair attempt.
pub struct Indexer {
    embedder: OllamaClient,
    store: VectorStore,
    expected_dimension: usize,
}

impl Indexer {
    #[inline]
    pub fn new(config: &Config, store: VectorStore) -> Result<Self> {
        let embedder = OllamaClient::new(&config.embedding)
            .context("Failed to initialize embedding client")?;

        Ok(Self {
            embedder,
            store,
            expected_dimension: config.embedding.dimension as usize,
        })
    }

    /// Load the corpus, embed every passage, and upsert keyed by passage id.
    /// Re-running on an unchanged corpus leaves the table the same size.
    /// `rebuild` drops the table first (required after a model change).
    #[inline]
    pub async fn seed(&mut self, corpus_path: &Path, rebuild: bool) -> Result<SeedStats> {
        let passages = corpus::load_passages(corpus_path)?;

        // Fail the whole run up front if the embedding service is down
        self.embedder
            .health_check()
            .context("Embedding service is unreachable; seeding aborted")?;

        if rebuild {
            info!("Rebuilding passages table from scratch");
            self.store.rebuild().await?;
        }

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .context("Failed to embed corpus passages")?;

        for (passage, embedding) in passages.iter().zip(embeddings.iter()) {
            if embedding.len() != self.expected_dimension {
                return Err(ChatbotError::Embedding(format!(
                    "Model {} produced a {}-dimensional vector for passage {} but the \
                     configured dimension is {}; fix the config and re-run with --rebuild",
                    self.embedder.model(),
                    embedding.len(),
                    passage.id,
                    self.expected_dimension
                )));
            }
        }

        let created_at = Utc::now().to_rfc3339();
        let records: Vec<PassageRecord> = passages
            .iter()
            .zip(embeddings)
            .map(|(passage, vector)| self.to_record(passage, vector, &created_at))
            .collect();

        let count = records.len();
        self.store.upsert_passages(records).await?;

        info!("Seeded {} passages into the vector store", count);
        Ok(SeedStats {
            passages: count,
            dimension: self.expected_dimension,
            model: self.embedder.model().to_string(),
        })
    }

    fn to_record(&self, passage: &Passage, vector: Vec<f32>, created_at: &str) -> PassageRecord {
        PassageRecord {
            id: passage.id,
            vector,
            metadata: PassageMetadata {
                text: passage.text.clone(),
                kanda: passage.kanda.clone(),
                topic: passage.topic.clone(),
                characters: passage.characters_joined(),
                embedding_model: self.embedder.model().to_string(),
                created_at: created_at.to_string(),
            },
        }
    }

    /// Hand the store back for post-seed inspection.
    #[inline]
    pub fn into_store(self) -> VectorStore {
        self.store
    }
}
