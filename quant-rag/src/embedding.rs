//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface and are injected into the pipeline as a strategy object. Errors
/// should be reported as [`RagError::Provider`](crate::RagError::Provider)
/// with the matching [`ProviderErrorKind`](crate::ProviderErrorKind).
///
/// # Example
///
/// ```rust,ignore
/// use quant_rag::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let embedding = provider.embed("AAPL beats earnings estimates").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Fail-fast: the first failing item aborts the batch and no partial
    /// list is returned. The default implementation calls
    /// [`embed`](EmbeddingProvider::embed) sequentially; backends that
    /// support native batching should override it with the same semantics.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
