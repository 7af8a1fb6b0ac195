#[cfg(test)]
mod tests;

use super::{PassageMetadata, PassageRecord};
use crate::ChatbotError;
use crate::config::Config;
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection, DistanceType,
    query::{ExecutableQuery, QueryBase},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TABLE_NAME: &str = "passages";

/// Vector database store using LanceDB for passage similarity search.
/// Constructed once at startup and passed in explicitly; the handle closes
/// with the process.
pub struct VectorStore {
    connection: Connection,
    table_name: String,
    vector_dimension: usize,
}

/// A retrieved passage with its similarity score
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub id: u32,
    pub metadata: PassageMetadata,
    /// Similarity in cosine space: 1 - distance, higher is better
    pub score: f32,
    pub distance: f32,
}

impl VectorStore {
    /// Open (or create the directory for) the vector database. If the
    /// passages table already exists, its vector width must match the
    /// configured embedding dimension; mixing models in one table is
    /// refused rather than repaired.
    #[inline]
    pub async fn new(config: &Config) -> Result<Self, ChatbotError> {
        let db_path = config.vector_db_path();
        debug!("Initializing LanceDB at path: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ChatbotError::Database(format!(
                    "Failed to create vector database directory: {}",
                    e
                ))
            })?;
        }

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri).execute().await.map_err(|e| {
            ChatbotError::Database(format!("Failed to connect to LanceDB: {}", e))
        })?;

        let store = Self {
            connection,
            table_name: TABLE_NAME.to_string(),
            vector_dimension: config.embedding.dimension as usize,
        };

        if store.table_exists().await? {
            let existing = store.detect_existing_vector_dimension().await?;
            if existing != store.vector_dimension {
                return Err(ChatbotError::Database(format!(
                    "Existing table has {}-dimensional vectors but the configured \
                     embedding dimension is {}; re-run `seed --rebuild` after changing \
                     the embedding model",
                    existing, store.vector_dimension
                )));
            }
            debug!("Opened existing passages table ({} dims)", existing);
        }

        info!("Vector store initialized successfully");
        Ok(store)
    }

    async fn table_exists(&self) -> Result<bool, ChatbotError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| ChatbotError::Database(format!("Failed to list tables: {}", e)))?;
        Ok(table_names.contains(&self.table_name))
    }

    /// Detect vector dimension from the existing table schema
    async fn detect_existing_vector_dimension(&self) -> Result<usize, ChatbotError> {
        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| {
                ChatbotError::Database(format!("Failed to open existing table: {}", e))
            })?;

        let schema = table
            .schema()
            .await
            .map_err(|e| ChatbotError::Database(format!("Failed to get table schema: {}", e)))?;

        for field in schema.fields() {
            if field.name() == "vector" {
                if let DataType::FixedSizeList(_, size) = field.data_type() {
                    return Ok(*size as usize);
                }
            }
        }

        Err(ChatbotError::Database(
            "Could not find vector column or determine dimension".to_string(),
        ))
    }

    fn create_schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::UInt32, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    self.vector_dimension as i32,
                ),
                false,
            ),
            Field::new("text", DataType::Utf8, false),
            Field::new("kanda", DataType::Utf8, false),
            Field::new("topic", DataType::Utf8, false),
            Field::new("characters", DataType::Utf8, false),
            Field::new("embedding_model", DataType::Utf8, false),
            Field::new("created_at", DataType::Utf8, false),
        ]))
    }

    async fn ensure_table(&self) -> Result<(), ChatbotError> {
        if self.table_exists().await? {
            return Ok(());
        }

        info!(
            "Creating passages table with {} dimensions",
            self.vector_dimension
        );

        self.connection
            .create_empty_table(&self.table_name, self.create_schema())
            .execute()
            .await
            .map_err(|e| ChatbotError::Database(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    /// Drop the passages table so the next upsert starts from an empty
    /// collection. Used by `seed --rebuild` and after model changes.
    #[inline]
    pub async fn rebuild(&mut self) -> Result<(), ChatbotError> {
        if self.table_exists().await? {
            info!("Dropping existing passages table");
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| ChatbotError::Database(format!("Failed to drop table: {}", e)))?;
        }
        Ok(())
    }

    /// Upsert a batch of passage records keyed by id: matching rows are
    /// deleted first, so re-seeding an unchanged corpus leaves the table
    /// the same size.
    #[inline]
    pub async fn upsert_passages(
        &mut self,
        records: Vec<PassageRecord>,
    ) -> Result<(), ChatbotError> {
        if records.is_empty() {
            debug!("No records to store");
            return Ok(());
        }

        for record in &records {
            if record.vector.len() != self.vector_dimension {
                return Err(ChatbotError::Database(format!(
                    "Passage {} has a {}-dimensional vector but the table expects {}; \
                     embeddings from different models must not be mixed",
                    record.id,
                    record.vector.len(),
                    self.vector_dimension
                )));
            }
        }

        self.ensure_table().await?;

        debug!("Upserting batch of {} passage records", records.len());

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| ChatbotError::Database(format!("Failed to open table: {}", e)))?;

        let ids: Vec<String> = records.iter().map(|r| r.id.to_string()).collect();
        let predicate = format!("id IN ({})", ids.join(", "));
        table.delete(&predicate).await.map_err(|e| {
            ChatbotError::Database(format!("Failed to delete existing rows: {}", e))
        })?;

        let record_batch = self.create_record_batch(&records)?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| ChatbotError::Database(format!("Failed to insert records: {}", e)))?;

        info!("Successfully upserted {} passage records", records.len());
        Ok(())
    }

    fn create_record_batch(&self, records: &[PassageRecord]) -> Result<RecordBatch, ChatbotError> {
        let len = records.len();

        let mut ids = Vec::with_capacity(len);
        let mut texts = Vec::with_capacity(len);
        let mut kandas = Vec::with_capacity(len);
        let mut topics = Vec::with_capacity(len);
        let mut characters = Vec::with_capacity(len);
        let mut models = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);

        for record in records {
            ids.push(record.id);
            texts.push(record.metadata.text.as_str());
            kandas.push(record.metadata.kanda.as_str());
            topics.push(record.metadata.topic.as_str());
            characters.push(record.metadata.characters.as_str());
            models.push(record.metadata.embedding_model.as_str());
            created_ats.push(record.metadata.created_at.as_str());
        }

        let mut flat_values = Vec::with_capacity(len * self.vector_dimension);
        for record in records {
            flat_values.extend_from_slice(&record.vector);
        }
        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array = FixedSizeListArray::try_new(
            field,
            self.vector_dimension as i32,
            Arc::new(values_array),
            None,
        )
        .map_err(|e| ChatbotError::Database(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
            Arc::new(UInt32Array::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(kandas)),
            Arc::new(StringArray::from(topics)),
            Arc::new(StringArray::from(characters)),
            Arc::new(StringArray::from(models)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(self.create_schema(), arrays)
            .map_err(|e| ChatbotError::Database(format!("Failed to create record batch: {}", e)))
    }

    /// Search for the `limit` nearest passages by cosine distance. An
    /// absent or empty table yields an empty result, never an error.
    #[inline]
    pub async fn search_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPassage>, ChatbotError> {
        if !self.table_exists().await? {
            warn!("Passages table does not exist yet; returning no results");
            return Ok(Vec::new());
        }

        debug!("Searching for similar vectors with limit: {}", limit);

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| ChatbotError::Database(format!("Failed to open table: {}", e)))?;

        let results = table
            .vector_search(query_vector)
            .map_err(|e| {
                ChatbotError::Database(format!("Failed to create vector search: {}", e))
            })?
            .column("vector")
            .distance_type(DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| ChatbotError::Database(format!("Failed to execute search: {}", e)))?;

        self.parse_search_results_stream(results).await
    }

    async fn parse_search_results_stream(
        &self,
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<ScoredPassage>, ChatbotError> {
        let mut scored = Vec::new();

        while let Some(batch_result) = results.try_next().await.map_err(|e| {
            ChatbotError::Database(format!("Failed to read result stream: {}", e))
        })? {
            scored.extend(self.parse_search_batch(&batch_result)?);
        }

        debug!("Parsed {} search results from stream", scored.len());
        Ok(scored)
    }

    fn parse_search_batch(&self, batch: &RecordBatch) -> Result<Vec<ScoredPassage>, ChatbotError> {
        let num_rows = batch.num_rows();
        let mut scored = Vec::with_capacity(num_rows);

        let ids = batch
            .column_by_name("id")
            .ok_or_else(|| ChatbotError::Database("Missing id column".to_string()))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| ChatbotError::Database("Invalid id column type".to_string()))?;

        let texts = string_column(batch, "text")?;
        let kandas = string_column(batch, "kanda")?;
        let topics = string_column(batch, "topic")?;
        let characters = string_column(batch, "characters")?;
        let models = string_column(batch, "embedding_model")?;
        let created_ats = string_column(batch, "created_at")?;

        let distances = batch
            .column_by_name("_distance")
            .map(|col| col.as_any().downcast_ref::<Float32Array>());

        for row in 0..num_rows {
            let metadata = PassageMetadata {
                text: texts.value(row).to_string(),
                kanda: kandas.value(row).to_string(),
                topic: topics.value(row).to_string(),
                characters: characters.value(row).to_string(),
                embedding_model: models.value(row).to_string(),
                created_at: created_ats.value(row).to_string(),
            };

            let distance = distances
                .flatten()
                .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            scored.push(ScoredPassage {
                id: ids.value(row),
                metadata,
                score: 1.0 - distance,
                distance,
            });
        }

        Ok(scored)
    }

    /// Total number of passage records stored.
    #[inline]
    pub async fn count(&self) -> Result<u64, ChatbotError> {
        if !self.table_exists().await? {
            return Ok(0);
        }

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| ChatbotError::Database(format!("Failed to open table: {}", e)))?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| ChatbotError::Database(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a StringArray, ChatbotError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| ChatbotError::Database(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ChatbotError::Database(format!("Invalid {} column type", name)))
}
