//! Recipe tests: context sizes, market data enrichment, and degradation.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::*;
use quant_rag::{Diagnostics, Quote};

fn market() -> StaticMarket {
    StaticMarket {
        quotes: HashMap::from([(
            "AAPL".to_string(),
            Quote { price: 212.4, change_percent: 1.5 },
        )]),
        volatility: HashMap::from([("NVDA".to_string(), 0.0412)]),
        news: HashMap::from([
            ("NVDA".to_string(), vec![headline("NVDA", "Export rules tighten")]),
            ("AMD".to_string(), vec![headline("AMD", "New accelerator ships")]),
        ]),
        ..StaticMarket::default()
    }
}

async fn seeded(generator: ScriptedGenerator, market: Option<StaticMarket>) -> Harness {
    let h = harness_with(
        KeywordEmbedder::default(),
        generator,
        market.map(Arc::new),
        Diagnostics::inherit(),
    );
    h.pipeline.ingest(corpus(12)).await.unwrap();
    h
}

#[tokio::test]
async fn summary_uses_five_documents_and_quote() {
    let h = seeded(ScriptedGenerator::answering("Solid quarter."), Some(market())).await;

    let answer = h.pipeline.stock_summary("AAPL", "1M").await.unwrap();
    assert_eq!(answer.context.len(), 5);
    let prompt = h.generator.last_prompt();
    assert!(prompt.contains("Provide a summary for AAPL stock."));
    assert!(prompt.contains("Current price: $212.40 (+1.50%)."));
    assert!(prompt.contains("Period: 1M."));
    let embedded = h.embedder.calls.lock().unwrap().clone();
    assert!(embedded.iter().any(|text| text == "Stock summary for AAPL over 1M"));
}

#[tokio::test]
async fn other_recipes_use_ten_documents() {
    let h = seeded(ScriptedGenerator::answering("LONG: AMD\nSHORT: INTC"), None).await;

    let volatility = h.pipeline.explain_volatility("NVDA", "2024-06-03").await.unwrap();
    assert_eq!(volatility.context.len(), 10);
    let sentiment = h.pipeline.compare_sentiment("NVDA", "AMD", "1W").await.unwrap();
    assert_eq!(sentiment.context.len(), 10);
    let pair = h.pipeline.recommend_pair("semiconductors").await.unwrap();
    assert_eq!(pair.answer.context.len(), 10);
    assert_eq!(h.pipeline.query("Who leads?", &[]).await.unwrap().context.len(), 10);
}

#[tokio::test]
async fn failed_quote_changes_wording_only() {
    let logs = CapturedLogs::default();
    let h = harness_with(
        KeywordEmbedder::default(),
        ScriptedGenerator::answering("Summary without price."),
        Some(Arc::new(market())),
        logs.diagnostics(),
    );

    let answer = h.pipeline.stock_summary("TSLA", "3M").await.unwrap();
    assert_eq!(answer.answer, "Summary without price.");
    let prompt = h.generator.last_prompt();
    assert!(prompt.contains("Provide a summary for TSLA stock. Period: 3M."));
    assert!(!prompt.contains("Current price"));
    assert!(logs.warnings().iter().any(|m| m.contains("quote lookup failed")));
}

#[tokio::test]
async fn volatility_recipe_folds_in_market_data() {
    let market = Arc::new(market());
    let h = harness_with(
        KeywordEmbedder::default(),
        ScriptedGenerator::answering("Export news."),
        Some(market.clone()),
        Diagnostics::inherit(),
    );

    h.pipeline.explain_volatility("NVDA", "2024-06-03").await.unwrap();
    let prompt = h.generator.last_prompt();
    assert!(prompt.contains("Explain why NVDA volatility was 0.0412 on 2024-06-03."));
    assert!(prompt.contains("- Export rules tighten (wire, 2024-06-03)"));
    assert_eq!(*market.news_limits.lock().unwrap(), vec![10]);
}

#[tokio::test]
async fn sentiment_survives_missing_news_for_one_side() {
    let h = seeded(ScriptedGenerator::answering("Mixed."), Some(market())).await;

    let answer = h.pipeline.compare_sentiment("AMD", "INTC", "1M").await.unwrap();
    assert_eq!(answer.answer, "Mixed.");
    let prompt = h.generator.last_prompt();
    assert!(prompt.contains("Compare market sentiment between AMD and INTC over 1M."));
    assert!(prompt.contains("Recent AMD headlines:"));
    assert!(!prompt.contains("Recent INTC headlines:"));
}

#[tokio::test]
async fn pair_recommendation_extracts_tickers() {
    let reply = "LONG: XOM\nSHORT: CVX\nXOM has stronger refining margins.";
    let h = seeded(ScriptedGenerator::answering(reply), None).await;

    let pair = h.pipeline.recommend_pair("energy").await.unwrap();
    assert_eq!(pair.long_ticker.as_deref(), Some("XOM"));
    assert_eq!(pair.short_ticker.as_deref(), Some("CVX"));
    assert_eq!(pair.answer.answer, reply);
    assert!(h.generator.last_prompt().contains("for the energy sector"));
}

#[tokio::test]
async fn pair_without_labels_is_not_an_error() {
    let h = seeded(ScriptedGenerator::answering("Hard to say this quarter."), None).await;

    let pair = h.pipeline.recommend_pair("utilities").await.unwrap();
    assert_eq!(pair.long_ticker, None);
    assert_eq!(pair.short_ticker, None);
}

#[tokio::test]
async fn open_query_lists_symbols() {
    let h = seeded(ScriptedGenerator::answering("AMD."), None).await;

    let symbols = vec!["AMD".to_string(), "INTC".to_string()];
    h.pipeline.query("Which chipmaker is cheaper?", &symbols).await.unwrap();
    assert!(
        h.generator
            .last_prompt()
            .starts_with("Query: Which chipmaker is cheaper? (symbols: AMD, INTC)\n\n")
    );
}
