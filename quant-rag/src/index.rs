//! Exact nearest-neighbor document index.
//!
//! [`FlatIndex`] stores embeddings in a single append-only arena (row `i`
//! belongs to slot `i`) and answers k-NN queries by brute-force squared
//! Euclidean distance. Documents are removed by tombstoning their slots: the
//! vector rows stay in the arena until [`FlatIndex::compact`] rebuilds it.
//!
//! The index is a plain single-owner structure. For shared use across
//! concurrent requests wrap it in an
//! [`InMemoryVectorStore`](crate::InMemoryVectorStore).

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, info};

use crate::document::{Document, SearchResult};
use crate::error::{RagError, Result};

/// Association between an arena row and the document that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) doc_id: String,
    pub(crate) live: bool,
}

/// An exact (flat) L2 vector index with document metadata and soft deletion.
///
/// # Example
///
/// ```rust,ignore
/// use quant_rag::{Document, FlatIndex};
///
/// let mut index = FlatIndex::new(3)?;
/// index.add_document(Document::new("a", "text", "news", "2024-01-02"), &[0.0, 0.0, 0.0])?;
/// let results = index.search(&[0.0, 0.0, 0.1], 5)?;
/// assert_eq!(results[0].document.doc_id, "a");
/// ```
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<f32>,
    slots: Vec<Slot>,
    documents: HashMap<String, Document>,
}

impl FlatIndex {
    /// Create an empty index for embeddings of length `dimension`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidDimension`] if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::InvalidDimension);
        }
        debug!(dimension, "flat index initialized");
        Ok(Self { dimension, vectors: Vec::new(), slots: Vec::new(), documents: HashMap::new() })
    }

    /// Rebuild an index from already-validated parts.
    pub(crate) fn from_parts(
        dimension: usize,
        vectors: Vec<f32>,
        slots: Vec<Slot>,
        documents: HashMap<String, Document>,
    ) -> Self {
        Self { dimension, vectors, slots, documents }
    }

    /// The fixed embedding length of this index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of live documents. Orphaned slots are not counted.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the index holds no live documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of vector rows in the arena, live or not.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of rows [`compact`](FlatIndex::compact) would reclaim.
    pub fn orphaned_slots(&self) -> usize {
        self.slots.len() - self.documents.len()
    }

    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub(crate) fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    pub(crate) fn documents(&self) -> &HashMap<String, Document> {
        &self.documents
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        if len != self.dimension {
            return Err(RagError::DimensionMismatch { expected: self.dimension, actual: len });
        }
        Ok(())
    }

    /// Add one document with its embedding.
    ///
    /// Re-adding an existing `doc_id` replaces its metadata and appends a
    /// second vector row; both rows stay searchable until compaction.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the embedding has the wrong
    /// length. The index is unchanged on error.
    pub fn add_document(&mut self, document: Document, embedding: &[f32]) -> Result<()> {
        self.check_dimension(embedding.len())?;
        debug!(doc_id = %document.doc_id, slot = self.slots.len(), "adding document");
        self.push(document, embedding);
        Ok(())
    }

    /// Add a batch of documents, appended in input order with contiguous slots.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CountMismatch`] if the lengths differ and
    /// [`RagError::DimensionMismatch`] if any embedding has the wrong length.
    /// Every embedding is validated first, so a rejected batch adds nothing.
    pub fn add_documents(
        &mut self,
        documents: Vec<Document>,
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        if documents.len() != embeddings.len() {
            return Err(RagError::CountMismatch {
                documents: documents.len(),
                embeddings: embeddings.len(),
            });
        }
        for embedding in embeddings {
            self.check_dimension(embedding.len())?;
        }

        let count = documents.len();
        self.vectors.reserve(count * self.dimension);
        self.slots.reserve(count);
        for (document, embedding) in documents.into_iter().zip(embeddings) {
            self.push(document, embedding);
        }
        info!(count, total = self.len(), "added documents to index");
        Ok(())
    }

    fn push(&mut self, document: Document, embedding: &[f32]) {
        self.vectors.extend_from_slice(embedding);
        self.slots.push(Slot { doc_id: document.doc_id.clone(), live: true });
        self.documents.insert(document.doc_id.clone(), document);
    }

    /// Find the `k` nearest live documents to `query`.
    ///
    /// `k` is clamped to the number of stored rows. Rows are ranked by
    /// ascending squared Euclidean distance, ties by ascending slot, and
    /// tombstoned rows are dropped after ranking, so fewer than `k` results
    /// may come back.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if `query` has the wrong length.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.check_dimension(query.len())?;
        if self.documents.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let k = k.min(self.slots.len());
        let mut ranked: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(slot, row)| (slot, squared_l2(row, query)))
            .collect();

        if k < ranked.len() {
            ranked.select_nth_unstable_by(k - 1, by_distance_then_slot);
            ranked.truncate(k);
        }
        ranked.sort_unstable_by(by_distance_then_slot);

        Ok(ranked
            .into_iter()
            .filter_map(|(slot, distance)| self.materialize(slot, distance))
            .collect())
    }

    fn materialize(&self, slot: usize, distance: f32) -> Option<SearchResult> {
        let entry = self.slots.get(slot).filter(|s| s.live)?;
        let document = self.documents.get(&entry.doc_id)?;
        Some(SearchResult {
            document: document.clone(),
            similarity_score: 1.0 / (1.0 + f64::from(distance)),
        })
    }

    /// Look up a live document by ID.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if no live document has this ID.
    pub fn get_document(&self, doc_id: &str) -> Result<&Document> {
        self.documents.get(doc_id).ok_or_else(|| RagError::NotFound(doc_id.to_string()))
    }

    /// Tombstone a document, returning its last stored value.
    ///
    /// The metadata entry is erased and every row owned by `doc_id` is marked
    /// dead. The rows themselves stay in the arena.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if no live document has this ID.
    pub fn remove_document(&mut self, doc_id: &str) -> Result<Document> {
        let document =
            self.documents.remove(doc_id).ok_or_else(|| RagError::NotFound(doc_id.to_string()))?;
        for slot in self.slots.iter_mut().filter(|s| s.doc_id == doc_id) {
            slot.live = false;
        }
        info!(doc_id, orphaned = self.orphaned_slots(), "removed document");
        Ok(document)
    }

    /// Rebuild the arena without tombstoned or superseded rows.
    ///
    /// Keeps the newest live row for each document and preserves the relative
    /// order of the kept rows. Returns the number of rows reclaimed.
    pub fn compact(&mut self) -> usize {
        let mut newest: HashMap<&str, usize> = HashMap::with_capacity(self.documents.len());
        for (position, slot) in self.slots.iter().enumerate().filter(|(_, s)| s.live) {
            newest.insert(slot.doc_id.as_str(), position);
        }
        let mut keep: Vec<usize> = newest.into_values().collect();
        keep.sort_unstable();

        let reclaimed = self.slots.len() - keep.len();
        if reclaimed == 0 {
            return 0;
        }

        let mut vectors = Vec::with_capacity(keep.len() * self.dimension);
        let mut slots = Vec::with_capacity(keep.len());
        for position in keep {
            let start = position * self.dimension;
            vectors.extend_from_slice(&self.vectors[start..start + self.dimension]);
            slots.push(self.slots[position].clone());
        }
        self.vectors = vectors;
        self.slots = slots;

        info!(reclaimed, remaining = self.slots.len(), "compacted index");
        reclaimed
    }
}

fn by_distance_then_slot(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

/// Squared Euclidean distance between two equal-length vectors.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
