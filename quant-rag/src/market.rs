//! Market data lookups used to enrich recipe prompts.
//!
//! The fetchers themselves (HTTP clients, databases) live outside this crate.
//! The pipeline treats every lookup as optional: a failure is logged and the
//! prompt is worded without the missing fact.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A point-in-time price quote.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    /// Last traded price.
    pub price: f64,
    /// Change versus the previous close, in percent.
    pub change_percent: f64,
}

/// A news article about one or more tickers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewsArticle {
    /// Provider-assigned article ID.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Article body or summary.
    pub content: String,
    /// Publisher name.
    pub source: String,
    /// Publication time as reported by the provider.
    pub published_time: String,
    /// Tickers the article mentions.
    #[serde(default)]
    pub tickers: Vec<String>,
}

/// Source of quotes, volatility figures, and news.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Latest quote for `symbol`.
    async fn quote(&self, symbol: &str) -> Result<Quote>;

    /// Realized volatility of `symbol` on `date`.
    async fn volatility(&self, symbol: &str, date: &str) -> Result<f64>;

    /// Up to `limit` recent articles mentioning `symbol`, newest first.
    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>>;
}
