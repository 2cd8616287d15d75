//! Vector store trait for storing and searching document embeddings.

use async_trait::async_trait;

use crate::document::{Document, SearchResult};
use crate::error::Result;

/// A shared document index with nearest-neighbor search.
///
/// Implementations are used concurrently by many requests. Lookups
/// (`search`, `get_document`, `len`) may run in parallel with each other;
/// mutations must have exclusive access.
///
/// # Example
///
/// ```rust,ignore
/// use quant_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(1536)?;
/// store.add_documents(documents, embeddings).await?;
/// let results = store.search(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The embedding length accepted by this store.
    fn dimension(&self) -> usize;

    /// Add one document with its embedding.
    async fn add_document(&self, document: Document, embedding: Vec<f32>) -> Result<()>;

    /// Add a batch of documents atomically: either all are added or none.
    async fn add_documents(&self, documents: Vec<Document>, embeddings: Vec<Vec<f32>>)
    -> Result<()>;

    /// Search for the `k` nearest live documents.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Tombstone a document, returning its last stored value.
    async fn remove_document(&self, doc_id: &str) -> Result<Document>;

    /// Fetch a live document by ID.
    async fn get_document(&self, doc_id: &str) -> Result<Document>;

    /// Number of live documents.
    async fn len(&self) -> usize;

    /// Whether the store holds no live documents.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
