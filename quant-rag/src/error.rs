//! Error types for the `quant-rag` crate.

use std::fmt;

use thiserror::Error;

/// Classification of a failure reported by an external provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// The request could not be delivered or the provider returned a server error.
    Network,
    /// The provider rejected the credentials.
    Auth,
    /// The provider throttled the request.
    RateLimit,
    /// The provider answered, but the body could not be interpreted.
    MalformedResponse,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::RateLimit => "rate limit",
            Self::MalformedResponse => "malformed response",
        };
        f.write_str(label)
    }
}

/// Errors that can occur in index and retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The index was constructed with a dimension of zero.
    #[error("Invalid dimension: index dimension must be greater than zero")]
    InvalidDimension,

    /// An embedding did not have the index dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the index was constructed with.
        expected: usize,
        /// The length of the offending vector.
        actual: usize,
    },

    /// A batch supplied a different number of documents and embeddings.
    #[error("Count mismatch: {documents} documents, {embeddings} embeddings")]
    CountMismatch {
        /// Number of documents in the batch.
        documents: usize,
        /// Number of embeddings in the batch.
        embeddings: usize,
    },

    /// No live document exists with the given ID.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Persisted index artifacts are inconsistent with each other.
    #[error("Corrupt index state: {0}")]
    CorruptState(String),

    /// An embedding or generation provider failed.
    #[error("Provider error ({provider}, {kind}): {message}")]
    Provider {
        /// The provider that produced the error.
        provider: String,
        /// The failure class.
        kind: ProviderErrorKind,
        /// A description of the failure.
        message: String,
    },

    /// A market data lookup failed.
    #[error("Market data error: {0}")]
    MarketData(String),

    /// The final generation stage failed or produced no text.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Persisted artifacts could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error while saving or loading an index.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Build a [`RagError::Provider`] error.
    pub fn provider(
        provider: impl Into<String>,
        kind: ProviderErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider { provider: provider.into(), kind, message: message.into() }
    }

    /// The provider failure class, if this is a provider error.
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            Self::Provider { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// A convenience result type for index and retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
