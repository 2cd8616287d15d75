//! Retrieval-augmented answering pipeline.
//!
//! The [`RagPipeline`] composes an [`EmbeddingProvider`], a [`VectorStore`],
//! and a [`GenerationProvider`]. Every request runs four stages in order:
//!
//! 1. embed the retrieval query,
//! 2. search the store,
//! 3. assemble the augmented prompt,
//! 4. generate the answer.
//!
//! Stages 1 and 2 degrade: a failure is logged and the request continues
//! with no context. Stage 4 is the only one that can fail a request.
//!
//! # Example
//!
//! ```rust,ignore
//! use quant_rag::{RagConfig, RagPipeline, InMemoryVectorStore};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(1536)?))
//!     .generation_provider(Arc::new(my_llm))
//!     .build()?;
//!
//! let answer = pipeline.query("What drove semiconductor stocks this week?", &[]).await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::RagConfig;
use crate::diagnostics::Diagnostics;
use crate::document::{ContextDocument, Document};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{GenerationProvider, GenerationRequest};
use crate::market::MarketDataSource;
use crate::prompt::{RecipeQuery, augmented_prompt};
use crate::vectorstore::VectorStore;

/// A generated answer with the documents that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagAnswer {
    /// The generated text.
    pub answer: String,
    /// Retrieved documents in rank order. Empty when retrieval degraded.
    pub context: Vec<ContextDocument>,
}

impl RagAnswer {
    /// Whether any retrieved document was attached to the prompt.
    pub fn used_context(&self) -> bool {
        !self.context.is_empty()
    }
}

/// The retrieval pipeline orchestrator.
///
/// Construct one via [`RagPipeline::builder()`]. The pipeline is cheap to
/// share behind an `Arc` and every method takes `&self`.
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    generation_provider: Arc<dyn GenerationProvider>,
    market_data: Option<Arc<dyn MarketDataSource>>,
    diagnostics: Diagnostics,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    pub(crate) fn market_data(&self) -> Option<&Arc<dyn MarketDataSource>> {
        self.market_data.as_ref()
    }

    pub(crate) fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Embed and store documents: contents are embedded in one batch, then
    /// added to the store in input order.
    ///
    /// Unlike query-time retrieval, ingestion does not degrade: any embedding
    /// or store error is returned and nothing is added.
    ///
    /// # Errors
    ///
    /// Returns the provider error from embedding or the store error from
    /// [`VectorStore::add_documents`].
    pub async fn ingest(&self, documents: Vec<Document>) -> Result<usize> {
        self.diagnostics.instrument(self.embed_and_store(documents)).await
    }

    async fn embed_and_store(&self, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(batch_size = texts.len(), error = %e, "embedding failed during ingestion");
            e
        })?;

        let count = documents.len();
        self.vector_store.add_documents(documents, embeddings).await.map_err(|e| {
            error!(count, error = %e, "store rejected ingestion batch");
            e
        })?;
        info!(count, "ingested documents");
        Ok(count)
    }

    /// Retrieve up to `k` context documents for `query`.
    ///
    /// Never fails: if embedding or search fails, the error is logged and an
    /// empty list is returned.
    pub async fn retrieve_context(&self, query: &str, k: usize) -> Vec<ContextDocument> {
        self.diagnostics.instrument(self.retrieve(query, k)).await
    }

    pub(crate) async fn retrieve(&self, query: &str, k: usize) -> Vec<ContextDocument> {
        let embedding = match self.embedding_provider.embed(query).await {
            Ok(embedding) if !embedding.is_empty() => embedding,
            Ok(_) => {
                warn!("embedding provider returned an empty vector, continuing without context");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "query embedding failed, continuing without context");
                return Vec::new();
            }
        };

        match self.vector_store.search(&embedding, k).await {
            Ok(results) => {
                debug!(k, result_count = results.len(), "retrieved context");
                results.into_iter().map(ContextDocument::from).collect()
            }
            Err(e) => {
                warn!(k, error = %e, "vector search failed, continuing without context");
                Vec::new()
            }
        }
    }

    /// Generate an answer for `question` grounded in `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationFailed`] if the provider fails or
    /// returns only whitespace.
    pub async fn answer_with_context(
        &self,
        question: &str,
        context: Vec<ContextDocument>,
    ) -> Result<RagAnswer> {
        self.diagnostics.instrument(self.generate(question, context)).await
    }

    pub(crate) async fn generate(
        &self,
        question: &str,
        context: Vec<ContextDocument>,
    ) -> Result<RagAnswer> {
        let request = GenerationRequest {
            prompt: augmented_prompt(question, &context),
            system_instruction: self.config.system_instruction.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let answer = self.generation_provider.generate(&request).await.map_err(|e| {
            error!(error = %e, "generation failed");
            RagError::GenerationFailed(e.to_string())
        })?;
        if answer.trim().is_empty() {
            error!(context_count = context.len(), "generation returned an empty answer");
            return Err(RagError::GenerationFailed("provider returned an empty answer".into()));
        }

        info!(context_count = context.len(), answer_len = answer.len(), "answer generated");
        Ok(RagAnswer { answer, context })
    }

    /// Run the four stages for a recipe.
    pub(crate) async fn run(&self, query: RecipeQuery, k: usize) -> Result<RagAnswer> {
        let context = self.retrieve(&query.retrieval, k).await;
        self.generate(&query.question, context).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// The config, embedding provider, vector store, and generation provider are
/// required. Market data and diagnostics are optional.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    market_data: Option<Arc<dyn MarketDataSource>>,
    diagnostics: Diagnostics,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Set the market data source used to enrich recipe prompts.
    pub fn market_data(mut self, source: Arc<dyn MarketDataSource>) -> Self {
        self.market_data = Some(source);
        self
    }

    /// Route the pipeline's log events through `diagnostics`.
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or
    /// the embedding provider's dimension differs from the store's.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| RagError::ConfigError("generation_provider is required".to_string()))?;

        if embedding_provider.dimensions() != vector_store.dimension() {
            return Err(RagError::ConfigError(format!(
                "embedding provider produces {} dimensions but the vector store expects {}",
                embedding_provider.dimensions(),
                vector_store.dimension()
            )));
        }

        Ok(RagPipeline {
            config,
            embedding_provider,
            vector_store,
            generation_provider,
            market_data: self.market_data,
            diagnostics: self.diagnostics,
        })
    }
}
