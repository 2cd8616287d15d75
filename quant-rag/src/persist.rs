//! On-disk layout for [`FlatIndex`].
//!
//! Saving an index at `path` writes two artifacts:
//!
//! - `path`: the vector arena, bincode-encoded (`dimension`, `rows`, row-major data).
//! - `path.meta`: JSON metadata listing every slot in order with its
//!   `doc_id`, liveness, and (for live slots) the stored document.
//!
//! Each artifact is written to a temporary sibling and renamed into place.
//! The pair is not written atomically as a unit; a crash between the two
//! renames leaves artifacts that [`FlatIndex::load`] rejects as corrupt.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::Document;
use crate::error::{RagError, Result};
use crate::index::{FlatIndex, Slot};

#[derive(Serialize, Deserialize)]
struct VectorArtifact {
    dimension: usize,
    rows: usize,
    data: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct MetadataArtifact {
    dimension: usize,
    count: usize,
    entries: Vec<SlotEntry>,
}

#[derive(Serialize, Deserialize)]
struct SlotEntry {
    doc_id: String,
    live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document: Option<Document>,
}

/// Encoded artifacts of an index, ready to be written.
#[derive(Debug, Clone)]
pub(crate) struct IndexSnapshot {
    pub(crate) vectors: Vec<u8>,
    pub(crate) metadata: Vec<u8>,
}

/// Path of the metadata artifact that accompanies the vector artifact at `path`.
pub fn metadata_path(path: &Path) -> PathBuf {
    with_suffix(path, ".meta")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

impl FlatIndex {
    pub(crate) fn encode(&self) -> Result<IndexSnapshot> {
        let vector_artifact = VectorArtifact {
            dimension: self.dimension(),
            rows: self.slot_count(),
            data: self.vectors().to_vec(),
        };
        let entries = self
            .slots()
            .iter()
            .map(|slot| SlotEntry {
                doc_id: slot.doc_id.clone(),
                live: slot.live,
                document: slot
                    .live
                    .then(|| self.documents().get(&slot.doc_id).cloned())
                    .flatten(),
            })
            .collect::<Vec<_>>();
        let metadata_artifact =
            MetadataArtifact { dimension: self.dimension(), count: entries.len(), entries };

        let vectors = bincode::serialize(&vector_artifact)
            .map_err(|e| RagError::Serialization(format!("vector artifact: {e}")))?;
        let metadata = serde_json::to_vec_pretty(&metadata_artifact)
            .map_err(|e| RagError::Serialization(format!("metadata artifact: {e}")))?;
        Ok(IndexSnapshot { vectors, metadata })
    }

    pub(crate) fn decode(vectors: &[u8], metadata: &[u8]) -> Result<Self> {
        let vector_artifact: VectorArtifact = bincode::deserialize(vectors)
            .map_err(|e| RagError::Serialization(format!("vector artifact: {e}")))?;
        let metadata_artifact: MetadataArtifact = serde_json::from_slice(metadata)
            .map_err(|e| RagError::Serialization(format!("metadata artifact: {e}")))?;

        let VectorArtifact { dimension, rows, data } = vector_artifact;
        if dimension == 0 {
            return Err(RagError::CorruptState("vector artifact has zero dimension".into()));
        }
        let expected = rows.checked_mul(dimension).ok_or_else(|| {
            RagError::CorruptState(format!("vector artifact claims {rows} rows of {dimension}"))
        })?;
        if data.len() != expected {
            return Err(RagError::CorruptState(format!(
                "vector artifact holds {} values, expected {rows} rows of {dimension}",
                data.len()
            )));
        }
        if metadata_artifact.dimension != dimension {
            return Err(RagError::CorruptState(format!(
                "metadata dimension {} does not match vector dimension {dimension}",
                metadata_artifact.dimension
            )));
        }
        if metadata_artifact.count != rows || metadata_artifact.entries.len() != rows {
            return Err(RagError::CorruptState(format!(
                "metadata lists {} slots ({} entries) but vector artifact has {rows} rows",
                metadata_artifact.count,
                metadata_artifact.entries.len()
            )));
        }

        let mut slots = Vec::with_capacity(rows);
        let mut documents = HashMap::new();
        for (position, entry) in metadata_artifact.entries.into_iter().enumerate() {
            match (entry.live, entry.document) {
                (true, Some(document)) => {
                    if document.doc_id != entry.doc_id {
                        return Err(RagError::CorruptState(format!(
                            "slot {position} belongs to '{}' but stores document '{}'",
                            entry.doc_id, document.doc_id
                        )));
                    }
                    documents.insert(entry.doc_id.clone(), document);
                }
                (true, None) => {
                    return Err(RagError::CorruptState(format!(
                        "live slot {position} ('{}') has no document",
                        entry.doc_id
                    )));
                }
                (false, _) => {}
            }
            slots.push(Slot { doc_id: entry.doc_id, live: entry.live });
        }

        Ok(FlatIndex::from_parts(dimension, data, slots, documents))
    }

    /// Write the index to `path` and `path.meta`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] or [`RagError::Serialization`] on failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.encode()?;
        write_replacing(path, &snapshot.vectors)?;
        write_replacing(&metadata_path(path), &snapshot.metadata)?;
        info!(path = %path.display(), slots = self.slot_count(), "saved index");
        Ok(())
    }

    /// Read an index previously written by [`save`](FlatIndex::save).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptState`] if the two artifacts disagree,
    /// [`RagError::Io`] or [`RagError::Serialization`] if they cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let vectors = std::fs::read(path)?;
        let metadata = std::fs::read(metadata_path(path))?;
        let index = Self::decode(&vectors, &metadata)?;
        info!(path = %path.display(), documents = index.len(), "loaded index");
        Ok(index)
    }

    /// Replace this index with the one stored at `path`.
    ///
    /// The stored index must have the same dimension. On any error this
    /// index is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the stored dimension
    /// differs, plus every error of [`load`](FlatIndex::load).
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let loaded = Self::load(path)?;
        self.replace_with(loaded)
    }

    pub(crate) fn replace_with(&mut self, loaded: FlatIndex) -> Result<()> {
        if loaded.dimension() != self.dimension() {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension(),
                actual: loaded.dimension(),
            });
        }
        *self = loaded;
        Ok(())
    }
}

fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = with_suffix(path, ".tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

pub(crate) async fn write_replacing_async(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = with_suffix(path, ".tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
