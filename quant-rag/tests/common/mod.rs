//! Mock providers and a log-capturing layer shared by pipeline tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quant_rag::{
    Diagnostics, Document, EmbeddingProvider, GenerationProvider, GenerationRequest,
    InMemoryVectorStore, MarketDataSource, NewsArticle, ProviderErrorKind, Quote, RagConfig,
    RagError, RagPipeline, Result, SearchResult, VectorStore,
};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub const DIM: usize = 3;

/// Embeds text by counting three keywords, so related texts land close together.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub fail: bool,
    pub empty: bool,
    pub calls: Mutex<Vec<String>>,
}

impl KeywordEmbedder {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Succeeds but returns zero-length vectors.
    pub fn empty() -> Self {
        Self { empty: true, ..Self::default() }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(RagError::provider("mock", ProviderErrorKind::RateLimit, "slow down"));
        }
        if self.empty {
            return Ok(Vec::new());
        }
        let lower = text.to_lowercase();
        Ok(["earnings", "volatility", "sentiment"]
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Records every request and replies with a fixed answer or error.
pub struct ScriptedGenerator {
    reply: std::result::Result<String, String>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn answering(answer: &str) -> Self {
        Self { reply: Ok(answer.to_string()), requests: Mutex::new(Vec::new()) }
    }

    pub fn failing(message: &str) -> Self {
        Self { reply: Err(message.to_string()), requests: Mutex::new(Vec::new()) }
    }

    pub fn last_prompt(&self) -> String {
        self.requests.lock().unwrap().last().map(|r| r.prompt.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(answer) => Ok(answer.clone()),
            Err(message) => {
                Err(RagError::provider("mock", ProviderErrorKind::Network, message.clone()))
            }
        }
    }
}

/// A store whose search always fails.
pub struct BrokenSearchStore;

#[async_trait]
impl VectorStore for BrokenSearchStore {
    fn dimension(&self) -> usize {
        DIM
    }

    async fn add_document(&self, _document: Document, _embedding: Vec<f32>) -> Result<()> {
        Ok(())
    }

    async fn add_documents(
        &self,
        _documents: Vec<Document>,
        _embeddings: Vec<Vec<f32>>,
    ) -> Result<()> {
        Ok(())
    }

    async fn search(&self, _embedding: &[f32], _k: usize) -> Result<Vec<SearchResult>> {
        Err(RagError::CorruptState("arena unavailable".into()))
    }

    async fn remove_document(&self, doc_id: &str) -> Result<Document> {
        Err(RagError::NotFound(doc_id.to_string()))
    }

    async fn get_document(&self, doc_id: &str) -> Result<Document> {
        Err(RagError::NotFound(doc_id.to_string()))
    }

    async fn len(&self) -> usize {
        0
    }
}

/// Canned market data. Symbols missing from a map fail the lookup.
#[derive(Default)]
pub struct StaticMarket {
    pub quotes: HashMap<String, Quote>,
    pub volatility: HashMap<String, f64>,
    pub news: HashMap<String, Vec<NewsArticle>>,
    pub news_limits: Mutex<Vec<usize>>,
}

fn unknown(symbol: &str) -> RagError {
    RagError::MarketData(format!("no data for {symbol}"))
}

#[async_trait]
impl MarketDataSource for StaticMarket {
    async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.quotes.get(symbol).copied().ok_or_else(|| unknown(symbol))
    }

    async fn volatility(&self, symbol: &str, _date: &str) -> Result<f64> {
        self.volatility.get(symbol).copied().ok_or_else(|| unknown(symbol))
    }

    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>> {
        self.news_limits.lock().unwrap().push(limit);
        self.news.get(symbol).cloned().ok_or_else(|| unknown(symbol))
    }
}

pub fn headline(symbol: &str, title: &str) -> NewsArticle {
    NewsArticle {
        id: format!("{symbol}-{title}"),
        title: title.to_string(),
        source: "wire".to_string(),
        published_time: "2024-06-03".to_string(),
        tickers: vec![symbol.to_string()],
        ..NewsArticle::default()
    }
}

/// Research notes covering all three keywords.
pub fn corpus(count: usize) -> Vec<Document> {
    let topics = ["earnings", "volatility", "sentiment"];
    (0..count)
        .map(|i| {
            let topic = topics[i % topics.len()];
            Document::new(
                format!("note-{i}"),
                format!("Note {i} about {topic}"),
                "research",
                format!("2024-06-{:02}", i + 1),
            )
        })
        .collect()
}

pub struct Harness {
    pub pipeline: RagPipeline,
    pub embedder: Arc<KeywordEmbedder>,
    pub generator: Arc<ScriptedGenerator>,
    pub store: Arc<InMemoryVectorStore>,
}

pub fn harness(embedder: KeywordEmbedder, generator: ScriptedGenerator) -> Harness {
    harness_with(embedder, generator, None, Diagnostics::inherit())
}

pub fn harness_with(
    embedder: KeywordEmbedder,
    generator: ScriptedGenerator,
    market: Option<Arc<StaticMarket>>,
    diagnostics: Diagnostics,
) -> Harness {
    let embedder = Arc::new(embedder);
    let generator = Arc::new(generator);
    let store = Arc::new(InMemoryVectorStore::new(DIM).unwrap());
    let mut builder = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(embedder.clone())
        .vector_store(store.clone())
        .generation_provider(generator.clone())
        .diagnostics(diagnostics);
    if let Some(market) = market {
        builder = builder.market_data(market);
    }
    Harness { pipeline: builder.build().unwrap(), embedder, generator, store }
}

/// Captured log events as `(level, message)` pairs.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<(tracing::Level, String)>>>);

impl CapturedLogs {
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::new(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn messages(&self, wanted: tracing::Level) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == wanted)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(tracing::Level::WARN)
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.0.lock().unwrap().push((*event.metadata().level(), visitor.0));
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
