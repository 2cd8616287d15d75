//! Concurrent in-memory vector store.
//!
//! This module provides [`InMemoryVectorStore`], a [`FlatIndex`] protected by
//! a `tokio::sync::RwLock`. The lock is fair: once a writer is queued, readers
//! arriving after it wait behind it, so a steady stream of searches cannot
//! starve an ingest or a reload.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::diagnostics::Diagnostics;
use crate::document::{Document, SearchResult};
use crate::error::Result;
use crate::index::FlatIndex;
use crate::persist::{metadata_path, write_replacing_async};
use crate::vectorstore::VectorStore;

/// A shared, lock-protected [`FlatIndex`].
///
/// Searches and lookups take a read guard; adds, removals, reloads, and
/// compaction take the write guard. [`save`](InMemoryVectorStore::save) only
/// holds a read guard while encoding, so a save that overlaps with writes
/// reflects the index as of the moment it started.
///
/// # Example
///
/// ```rust,ignore
/// use quant_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(1536)?;
/// store.load("data/market.index").await?;
/// ```
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimension: usize,
    index: RwLock<FlatIndex>,
    diagnostics: Diagnostics,
}

impl InMemoryVectorStore {
    /// Create an empty store for embeddings of length `dimension`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidDimension`](crate::RagError::InvalidDimension)
    /// if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        Ok(Self::from_index(FlatIndex::new(dimension)?))
    }

    /// Wrap an existing index.
    pub fn from_index(index: FlatIndex) -> Self {
        Self {
            dimension: index.dimension(),
            index: RwLock::new(index),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Route this store's log events through `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Persist the index to `path` and `path.meta`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`](crate::RagError::Io) or
    /// [`RagError::Serialization`](crate::RagError::Serialization) on failure.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.diagnostics.instrument(self.write_snapshot(path.as_ref())).await
    }

    async fn write_snapshot(&self, path: &Path) -> Result<()> {
        let snapshot = {
            let index = self.index.read().await;
            index.encode()?
        };
        write_replacing_async(path, &snapshot.vectors).await?;
        write_replacing_async(&metadata_path(path), &snapshot.metadata).await?;
        info!(path = %path.display(), "saved vector store");
        Ok(())
    }

    /// Replace the index contents with the artifacts at `path`.
    ///
    /// The artifacts are read and validated before the write guard is taken.
    /// On any error the current contents are kept.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptState`](crate::RagError::CorruptState) if
    /// the artifacts disagree,
    /// [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch) if
    /// they were saved with another dimension, and I/O or decoding errors.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        self.diagnostics.instrument(self.replace_from(path.as_ref())).await
    }

    async fn replace_from(&self, path: &Path) -> Result<()> {
        let loaded = match read_index(path).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load vector store");
                return Err(e);
            }
        };
        let documents = loaded.len();
        self.index.write().await.replace_with(loaded)?;
        info!(path = %path.display(), documents, "loaded vector store");
        Ok(())
    }

    /// Rebuild the arena without orphaned rows. Returns the number reclaimed.
    pub async fn compact(&self) -> usize {
        let mut index = self.index.write().await;
        self.diagnostics.in_scope(|| index.compact())
    }

    /// Number of vector rows, including orphaned ones.
    pub async fn slot_count(&self) -> usize {
        self.index.read().await.slot_count()
    }

    /// Number of rows held by removed or superseded documents.
    pub async fn orphaned_slots(&self) -> usize {
        self.index.read().await.orphaned_slots()
    }
}

async fn read_index(path: &Path) -> Result<FlatIndex> {
    let vectors = tokio::fs::read(path).await?;
    let metadata = tokio::fs::read(metadata_path(path)).await?;
    FlatIndex::decode(&vectors, &metadata)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn add_document(&self, document: Document, embedding: Vec<f32>) -> Result<()> {
        self.diagnostics
            .instrument(async {
                let mut index = self.index.write().await;
                index.add_document(document, &embedding)
            })
            .await
    }

    async fn add_documents(
        &self,
        documents: Vec<Document>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<()> {
        self.diagnostics
            .instrument(async {
                let mut index = self.index.write().await;
                index.add_documents(documents, &embeddings)
            })
            .await
    }

    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.diagnostics
            .instrument(async {
                let index = self.index.read().await;
                let results = index.search(embedding, k);
                if let Ok(found) = &results {
                    debug!(k, result_count = found.len(), "vector search completed");
                }
                results
            })
            .await
    }

    async fn remove_document(&self, doc_id: &str) -> Result<Document> {
        self.diagnostics
            .instrument(async {
                let mut index = self.index.write().await;
                index.remove_document(doc_id)
            })
            .await
    }

    async fn get_document(&self, doc_id: &str) -> Result<Document> {
        let index = self.index.read().await;
        index.get_document(doc_id).cloned()
    }

    async fn len(&self) -> usize {
        self.index.read().await.len()
    }
}
