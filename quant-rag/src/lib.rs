//! # quant-rag
//!
//! Retrieval-augmented answering for market research questions.
//!
//! ## Overview
//!
//! The crate has two halves:
//!
//! - An exact vector document index: [`FlatIndex`] for single-owner use and
//!   [`InMemoryVectorStore`] for sharing across concurrent requests. Both
//!   support soft deletion and save/load of the full index state.
//! - A retrieval pipeline, [`RagPipeline`], that embeds a query, searches the
//!   index, builds an augmented prompt, and asks a generation provider for
//!   the answer. Embedding, search, and market data failures degrade to a
//!   prompt without that input; only generation failures fail a request.
//!
//! Providers are injected as trait objects ([`EmbeddingProvider`],
//! [`GenerationProvider`], [`MarketDataSource`]). The `openai` feature
//! (enabled by default) ships OpenAI-backed providers in [`openai`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quant_rag::openai::{OpenAIEmbeddingProvider, OpenAIGenerationProvider};
//! use quant_rag::{InMemoryVectorStore, RagConfig, RagPipeline};
//!
//! let store = Arc::new(InMemoryVectorStore::new(1536)?);
//! store.load("data/market.index").await?;
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .generation_provider(Arc::new(OpenAIGenerationProvider::from_env()?))
//!     .vector_store(store)
//!     .build()?;
//!
//! let summary = pipeline.stock_summary("AAPL", "1M").await?;
//! println!("{}", summary.answer);
//! ```

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod inmemory;
pub mod market;
pub mod persist;
pub mod pipeline;
pub mod prompt;
pub mod recipes;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;

pub use config::{RagConfig, RagConfigBuilder};
pub use diagnostics::Diagnostics;
pub use document::{ContextDocument, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{ProviderErrorKind, RagError, Result};
pub use generation::{GenerationProvider, GenerationRequest};
pub use index::FlatIndex;
pub use inmemory::InMemoryVectorStore;
pub use market::{MarketDataSource, NewsArticle, Quote};
pub use pipeline::{RagAnswer, RagPipeline, RagPipelineBuilder};
pub use recipes::PairRecommendation;
pub use vectorstore::VectorStore;
