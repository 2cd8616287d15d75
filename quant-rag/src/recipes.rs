//! The five query recipes offered by [`RagPipeline`].
//!
//! Each recipe builds a query template, optionally enriched with market data,
//! and runs it through the shared retrieve-and-generate stages. Market data
//! lookups degrade like retrieval does: a failed lookup changes the prompt
//! wording and is logged, nothing more.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::market::{NewsArticle, Quote};
use crate::pipeline::{RagAnswer, RagPipeline};
use crate::prompt;

/// A long/short pair suggested for a sector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairRecommendation {
    /// Ticker to buy, if the answer named one on a `LONG:` line.
    pub long_ticker: Option<String>,
    /// Ticker to sell short, if the answer named one on a `SHORT:` line.
    pub short_ticker: Option<String>,
    /// The full answer and its context.
    pub answer: RagAnswer,
}

impl RagPipeline {
    /// Summarize a stock over `period`, citing the current quote when available.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationFailed`](crate::RagError::GenerationFailed)
    /// if generation fails.
    pub async fn stock_summary(&self, symbol: &str, period: &str) -> Result<RagAnswer> {
        self.diagnostics()
            .instrument(async {
                info!(recipe = "stock_summary", symbol, period, "running recipe");
                let quote = self.lookup_quote(symbol).await;
                let query = prompt::stock_summary(symbol, period, quote.as_ref());
                self.run(query, self.config().summary_top_k).await
            })
            .await
    }

    /// Explain the volatility of `symbol` on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationFailed`](crate::RagError::GenerationFailed)
    /// if generation fails.
    pub async fn explain_volatility(&self, symbol: &str, date: &str) -> Result<RagAnswer> {
        self.diagnostics()
            .instrument(async {
                info!(recipe = "explain_volatility", symbol, date, "running recipe");
                let volatility = self.lookup_volatility(symbol, date).await;
                let news = self.lookup_news(symbol).await;
                let query = prompt::volatility(symbol, date, volatility, &news);
                self.run(query, self.config().top_k).await
            })
            .await
    }

    /// Compare market sentiment between two tickers over `period`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationFailed`](crate::RagError::GenerationFailed)
    /// if generation fails.
    pub async fn compare_sentiment(
        &self,
        first: &str,
        second: &str,
        period: &str,
    ) -> Result<RagAnswer> {
        self.diagnostics()
            .instrument(async {
                info!(recipe = "compare_sentiment", first, second, period, "running recipe");
                let first_news = self.lookup_news(first).await;
                let second_news = self.lookup_news(second).await;
                let query = prompt::sentiment(first, second, period, &first_news, &second_news);
                self.run(query, self.config().top_k).await
            })
            .await
    }

    /// Recommend a long/short pair within `sector`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationFailed`](crate::RagError::GenerationFailed)
    /// if generation fails. Tickers missing from the answer are not an error.
    pub async fn recommend_pair(&self, sector: &str) -> Result<PairRecommendation> {
        self.diagnostics().instrument(self.pair_recommendation(sector)).await
    }

    async fn pair_recommendation(&self, sector: &str) -> Result<PairRecommendation> {
        info!(recipe = "recommend_pair", sector, "running recipe");
        let answer = self.run(prompt::pair(sector), self.config().top_k).await?;
        let (long_ticker, short_ticker) = prompt::parse_pair(&answer.answer);
        if long_ticker.is_none() || short_ticker.is_none() {
            warn!(sector, ?long_ticker, ?short_ticker, "answer did not name both legs");
        }
        Ok(PairRecommendation { long_ticker, short_ticker, answer })
    }

    /// Answer a free-form question, optionally scoped to `symbols`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationFailed`](crate::RagError::GenerationFailed)
    /// if generation fails.
    pub async fn query(&self, query: &str, symbols: &[String]) -> Result<RagAnswer> {
        self.diagnostics()
            .instrument(async {
                info!(recipe = "query", symbol_count = symbols.len(), "running recipe");
                self.run(prompt::open_query(query, symbols), self.config().top_k).await
            })
            .await
    }

    async fn lookup_quote(&self, symbol: &str) -> Option<Quote> {
        let source = self.market_data()?;
        match source.quote(symbol).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!(symbol, error = %e, "quote lookup failed, summarizing without price");
                None
            }
        }
    }

    async fn lookup_volatility(&self, symbol: &str, date: &str) -> Option<f64> {
        let source = self.market_data()?;
        match source.volatility(symbol, date).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(symbol, date, error = %e, "volatility lookup failed");
                None
            }
        }
    }

    async fn lookup_news(&self, symbol: &str) -> Vec<NewsArticle> {
        let Some(source) = self.market_data() else {
            return Vec::new();
        };
        let limit = self.config().news_limit;
        if limit == 0 {
            return Vec::new();
        }
        match source.news(symbol, limit).await {
            Ok(mut articles) => {
                articles.truncate(limit);
                articles
            }
            Err(e) => {
                warn!(symbol, error = %e, "news lookup failed");
                Vec::new()
            }
        }
    }
}
