//! Data types for indexed documents, search results, and retrieval context.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A document stored in the vector index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Caller-assigned unique identifier.
    pub doc_id: String,
    /// The text content of the document.
    pub content: String,
    /// Where the document came from (feed name, URL, filing type).
    pub source: String,
    /// Publication or observation time, as supplied by the caller.
    pub timestamp: String,
    /// Key-value metadata associated with the document.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with empty metadata.
    pub fn new(
        doc_id: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            content: content.into(),
            source: source.into(),
            timestamp: timestamp.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry, replacing any previous value for `key`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A [`Document`] returned by a nearest-neighbor search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Snapshot of the matched document.
    pub document: Document,
    /// `1 / (1 + distance)`; higher is more similar.
    pub similarity_score: f64,
}

/// A retrieved document as handed to prompt construction and returned to callers.
///
/// Carries the same fields as [`SearchResult`] so the orchestration layer
/// never depends on index types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextDocument {
    /// ID of the source document.
    pub doc_id: String,
    /// Document text placed in the prompt.
    pub content: String,
    /// Where the document came from (news wire, filing, research note).
    pub source: String,
    /// Publication time as stored with the document.
    pub timestamp: String,
    /// Similarity to the query, `1 / (1 + distance)`.
    pub similarity_score: f64,
    /// Caller-supplied metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl From<SearchResult> for ContextDocument {
    fn from(result: SearchResult) -> Self {
        let SearchResult { document, similarity_score } = result;
        Self {
            doc_id: document.doc_id,
            content: document.content,
            source: document.source,
            timestamp: document.timestamp,
            similarity_score,
            metadata: document.metadata,
        }
    }
}
