#[cfg(test)]
mod tests;

use super::{ChunkRecord, EmbeddingRecord};
use crate::{DocsError, config::Config};
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TABLE_NAME: &str = "chunks";

/// Persistent vector store using LanceDB for similarity search
pub struct VectorStore {
    connection: Connection,
    table_name: String,
    vector_dimension: Option<usize>,
    default_dimension: usize,
}

/// Result row from a vector similarity search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: ChunkRecord,
    pub similarity_score: f32,
    pub distance: f32,
}

impl VectorStore {
    /// Open (or create) the vector store at the configured directory
    #[inline]
    pub async fn new(config: &Config) -> Result<Self, DocsError> {
        let db_path = config.vector_store_path();
        debug!("Initializing LanceDB at path: {:?}", db_path);

        std::fs::create_dir_all(&db_path).map_err(|e| {
            DocsError::Store(format!("Failed to create vector store directory: {}", e))
        })?;

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to connect to LanceDB: {}", e)))?;

        let mut store = Self {
            connection,
            table_name: TABLE_NAME.to_string(),
            vector_dimension: None,
            default_dimension: config.ollama.embedding_dimension as usize,
        };

        store.initialize_table().await?;

        info!("Vector store initialized successfully");
        Ok(store)
    }

    /// Create the chunks table if missing, otherwise detect the stored
    /// vector dimension from its schema
    async fn initialize_table(&mut self) -> Result<(), DocsError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to list tables: {}", e)))?;

        if table_names.contains(&self.table_name) {
            match self.detect_existing_vector_dimension().await {
                Ok(dim) => {
                    self.vector_dimension = Some(dim);
                    debug!("Detected existing vector dimension: {}", dim);
                }
                Err(e) => {
                    warn!(
                        "Could not detect vector dimension from existing table: {}",
                        e
                    );
                    self.vector_dimension = Some(self.default_dimension);
                }
            }
            return Ok(());
        }

        let schema = self.create_schema(self.default_dimension);

        self.connection
            .create_empty_table(&self.table_name, schema)
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to create table: {}", e)))?;

        self.vector_dimension = Some(self.default_dimension);
        info!(
            "Chunks table created with {} dimensions",
            self.default_dimension
        );
        Ok(())
    }

    /// Detect vector dimension from an existing table schema
    async fn detect_existing_vector_dimension(&self) -> Result<usize, DocsError> {
        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to open existing table: {}", e)))?;

        let schema = table
            .schema()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to get table schema: {}", e)))?;

        for field in schema.fields() {
            if field.name() == "vector" {
                if let DataType::FixedSizeList(_, size) = field.data_type() {
                    return Ok(*size as usize);
                }
            }
        }

        Err(DocsError::Store(
            "Could not find vector column or determine dimension".to_string(),
        ))
    }

    fn create_schema(&self, vector_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    vector_dim as i32,
                ),
                false,
            ),
            Field::new("source", DataType::Utf8, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("created_at", DataType::Utf8, false),
        ]))
    }

    /// Store a batch of embeddings with their chunk metadata
    #[inline]
    pub async fn store_batch(&mut self, records: Vec<EmbeddingRecord>) -> Result<(), DocsError> {
        if records.is_empty() {
            debug!("No embeddings to store");
            return Ok(());
        }

        debug!("Storing batch of {} embeddings", records.len());

        // Auto-detect vector dimension from the first record and recreate
        // the table if the embedding model changed
        let vector_dim = records[0].vector.len();
        if self.vector_dimension != Some(vector_dim) {
            info!(
                "Vector dimension changed from {:?} to {}, recreating table",
                self.vector_dimension, vector_dim
            );
            self.recreate_table_with_dimension(vector_dim).await?;
            self.vector_dimension = Some(vector_dim);
        }

        let record_batch = self.create_record_batch(&records)?;

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to open table: {}", e)))?;

        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to insert embeddings: {}", e)))?;

        info!("Successfully stored {} embeddings", records.len());
        Ok(())
    }

    /// Drop and recreate the table, discarding all stored chunks.
    /// Ingestion calls this so re-embedding a corpus overwrites the old one.
    #[inline]
    pub async fn reset(&mut self) -> Result<(), DocsError> {
        self.drop_table_if_exists().await?;

        let dimension = self.vector_dimension.unwrap_or(self.default_dimension);
        let schema = self.create_schema(dimension);
        self.connection
            .create_empty_table(&self.table_name, schema)
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to recreate table: {}", e)))?;

        info!("Vector store reset");
        Ok(())
    }

    async fn recreate_table_with_dimension(&self, vector_dim: usize) -> Result<(), DocsError> {
        self.drop_table_if_exists().await?;

        let schema = self.create_schema(vector_dim);
        self.connection
            .create_empty_table(&self.table_name, schema)
            .execute()
            .await
            .map_err(|e| {
                DocsError::Store(format!("Failed to create table with new dimensions: {}", e))
            })?;

        info!("Table recreated with {} dimensions", vector_dim);
        Ok(())
    }

    fn create_record_batch(&self, records: &[EmbeddingRecord]) -> Result<RecordBatch, DocsError> {
        let len = records.len();
        let vector_dim = self
            .vector_dimension
            .ok_or_else(|| DocsError::Store("Vector dimension not set".to_string()))?;

        let mut ids = Vec::with_capacity(len);
        let mut vectors = Vec::with_capacity(len);
        let mut sources = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);

        for record in records {
            ids.push(record.id.as_str());
            vectors.push(record.vector.clone());
            sources.push(record.metadata.source.as_str());
            contents.push(record.metadata.content.as_str());
            chunk_indices.push(record.metadata.chunk_index);
            created_ats.push(record.metadata.created_at.as_str());
        }

        let schema = self.create_schema(vector_dim);

        let mut flat_values = Vec::with_capacity(len * vector_dim);
        for vector in &vectors {
            flat_values.extend_from_slice(vector);
        }
        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(field, vector_dim as i32, Arc::new(values_array), None)
                .map_err(|e| DocsError::Store(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(sources)),
            Arc::new(StringArray::from(contents)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| DocsError::Store(format!("Failed to create record batch: {}", e)))
    }

    /// Search for the `limit` chunks nearest to the query vector.
    /// Results are ordered by descending similarity. A missing or empty
    /// table yields an empty result set rather than an error.
    #[inline]
    pub async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, DocsError> {
        debug!("Searching for similar vectors with limit: {}", limit);

        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to list tables: {}", e)))?;

        if !table_names.contains(&self.table_name) {
            debug!("Chunks table does not exist, returning no results");
            return Ok(Vec::new());
        }

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to open table: {}", e)))?;

        let query = table
            .vector_search(query_vector)
            .map_err(|e| DocsError::Store(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(limit);

        let results = query
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to execute search: {}", e)))?;

        self.parse_search_results_stream(results).await
    }

    async fn parse_search_results_stream(
        &self,
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<SearchResult>, DocsError> {
        let mut search_results = Vec::new();

        while let Some(batch_result) = results
            .try_next()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to read result stream: {}", e)))?
        {
            let parsed_batch = Self::parse_search_batch(&batch_result)?;
            search_results.extend(parsed_batch);
        }

        debug!("Parsed {} search results from stream", search_results.len());
        Ok(search_results)
    }

    fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>, DocsError> {
        let mut search_results = Vec::new();
        let num_rows = batch.num_rows();

        let sources = Self::string_column(batch, "source")?;
        let contents = Self::string_column(batch, "content")?;
        let created_ats = Self::string_column(batch, "created_at")?;

        let chunk_indices = batch
            .column_by_name("chunk_index")
            .ok_or_else(|| DocsError::Store("Missing chunk_index column".to_string()))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| DocsError::Store("Invalid chunk_index column type".to_string()))?;

        let distances = batch
            .column_by_name("_distance")
            .map(|col| col.as_any().downcast_ref::<Float32Array>());

        for row in 0..num_rows {
            let chunk = ChunkRecord {
                source: sources.value(row).to_string(),
                content: contents.value(row).to_string(),
                chunk_index: chunk_indices.value(row),
                created_at: created_ats.value(row).to_string(),
            };

            let distance = distances
                .flatten()
                .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            // Convert distance to a similarity score (higher is better)
            let similarity_score = 1.0 - distance;

            search_results.push(SearchResult {
                chunk,
                similarity_score,
                distance,
            });
        }

        Ok(search_results)
    }

    fn string_column<'a>(
        batch: &'a RecordBatch,
        name: &str,
    ) -> Result<&'a StringArray, DocsError> {
        batch
            .column_by_name(name)
            .ok_or_else(|| DocsError::Store(format!("Missing {} column", name)))?
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| DocsError::Store(format!("Invalid {} column type", name)))
    }

    /// Get the total number of chunks stored
    #[inline]
    pub async fn count(&self) -> Result<u64, DocsError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to list tables: {}", e)))?;

        if !table_names.contains(&self.table_name) {
            return Ok(0);
        }

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to open table: {}", e)))?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| DocsError::Store(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    async fn drop_table_if_exists(&self) -> Result<(), DocsError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| DocsError::Store(format!("Failed to list tables for drop: {}", e)))?;

        if table_names.contains(&self.table_name) {
            debug!("Dropping existing chunks table");
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| DocsError::Store(format!("Failed to drop table: {}", e)))?;
        }

        Ok(())
    }
}
