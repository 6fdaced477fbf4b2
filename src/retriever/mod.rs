
use itertools::Itertools;
use tracing::debug;

use crate::{DocsError, Result};
use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::store::VectorStore;

/// Default number of passages returned by a search
pub const DEFAULT_RESULT_COUNT: usize = 5;

const WRAP_WIDTH: usize = 80;

/// Reusable query-side object: opens the persisted vector store with the
/// same embedding function used at ingestion time
pub struct DocsRetriever {
    store: VectorStore,
    client: OllamaClient,
}

/// A retrieved passage with its relevance score (higher = more similar)
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedPassage {
    pub content: String,
    pub source: String,
    pub relevance: f32,
}

impl DocsRetriever {
    #[inline]
    pub async fn new(config: &Config) -> Result<Self> {
        let store = VectorStore::new(config).await?;
        let client = OllamaClient::new(config)
            .map_err(|e| DocsError::Embedding(format!("Failed to create client: {e:#}")))?;
        Ok(Self { store, client })
    }

    /// Name of the embedding model used for queries
    #[inline]
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Search the store for the `k` chunks most relevant to the query
    #[inline]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        debug!("Searching for {} results matching: {}", k, query);

        let query_embedding = self
            .client
            .embed_text(query)
            .map_err(|e| DocsError::Embedding(format!("Failed to embed query: {e:#}")))?;

        let results = self.store.search(&query_embedding.embedding, k).await?;

        let mut passages: Vec<RetrievedPassage> = results
            .into_iter()
            .map(|result| RetrievedPassage {
                content: result.chunk.content,
                source: result.chunk.source,
                relevance: result.similarity_score,
            })
            .collect();
        passages.truncate(k);

        debug!("Retrieved {} passages", passages.len());
        Ok(passages)
    }

    /// Like `search`, but drops exact-content duplicates while preserving
    /// first-seen order. Overlapping chunk windows can surface near-identical
    /// content under different scores; only the best-ranked copy survives.
    #[inline]
    pub async fn search_deduped(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        let passages = self.search(query, k).await?;
        Ok(dedup_passages(passages))
    }
}

/// Remove passages whose content exactly matches an earlier passage
#[inline]
pub fn dedup_passages(passages: Vec<RetrievedPassage>) -> Vec<RetrievedPassage> {
    passages
        .into_iter()
        .unique_by(|passage| passage.content.clone())
        .collect()
}

/// Format results as simple numbered blocks with 2-decimal relevance
#[inline]
pub fn format_results(results: &[RetrievedPassage]) -> String {
    if results.is_empty() {
        return "No relevant documentation found.".to_string();
    }

    let mut formatted =
        String::from("Here are the most relevant sections from the documentation:\n\n");

    for (i, result) in results.iter().enumerate() {
        formatted.push_str(&format!(
            "[Result {}] (Relevance: {:.2})\n{}\n\n",
            i + 1,
            result.relevance,
            result.content
        ));
    }

    formatted
}

/// Format results as separator-delimited blocks with wrapped content,
/// source metadata, and 4-decimal relevance
#[inline]
pub fn format_results_detailed(results: &[RetrievedPassage]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let blocks: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let wrapped_content = textwrap::fill(&result.content, WRAP_WIDTH);
            let source = if result.source.is_empty() {
                "Unknown"
            } else {
                result.source.as_str()
            };

            format!(
                "\nResult {} (Relevance Score: {:.4})\n{}\nContent:\n{}\n\nSource: {}\n{}",
                i + 1,
                result.relevance,
                "-".repeat(WRAP_WIDTH),
                wrapped_content,
                source,
                "=".repeat(WRAP_WIDTH)
            )
        })
        .collect();

    blocks.join("\n")
}
