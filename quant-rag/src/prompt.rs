//! Prompt assembly.
//!
//! Everything here is pure string construction so prompt wording can be
//! tested without any provider.

use crate::document::ContextDocument;
use crate::market::{NewsArticle, Quote};

/// Closing line when retrieved documents were attached.
pub const WITH_CONTEXT_INSTRUCTION: &str =
    "Based on the above context, please provide a comprehensive answer to the query.";

/// Closing line when nothing was retrieved.
pub const NO_CONTEXT_INSTRUCTION: &str = "No supporting documents were retrieved. \
     Answer the query from general knowledge and say that no context was available.";

/// Build the augmented prompt sent to the generation provider.
///
/// The header carries the raw query. Context documents, if any, follow in
/// rank order, numbered from 1.
pub fn augmented_prompt(query: &str, context: &[ContextDocument]) -> String {
    let mut prompt = format!("Query: {query}\n\n");
    if context.is_empty() {
        prompt.push_str(NO_CONTEXT_INSTRUCTION);
        prompt.push('\n');
        return prompt;
    }

    prompt.push_str("Context from financial data and news:\n");
    for (i, doc) in context.iter().enumerate() {
        prompt.push_str(&format!(
            "\n[Document {}]\nSource: {}\nTimestamp: {}\nContent: {}\n",
            i + 1,
            doc.source,
            doc.timestamp,
            doc.content
        ));
    }
    prompt.push_str("\n\n");
    prompt.push_str(WITH_CONTEXT_INSTRUCTION);
    prompt.push('\n');
    prompt
}

/// Retrieval and generation queries for one recipe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecipeQuery {
    /// Text embedded for the similarity search.
    pub(crate) retrieval: String,
    /// Text placed in the prompt header.
    pub(crate) question: String,
}

pub(crate) fn stock_summary(symbol: &str, period: &str, quote: Option<&Quote>) -> RecipeQuery {
    let price = quote
        .map(|q| format!("Current price: ${:.2} ({:+.2}%). ", q.price, q.change_percent))
        .unwrap_or_default();
    let question = format!(
        "Provide a summary for {symbol} stock. {price}Period: {period}. \
         Include key metrics, recent news, and market sentiment."
    );
    RecipeQuery { retrieval: format!("Stock summary for {symbol} over {period}"), question }
}

pub(crate) fn volatility(
    symbol: &str,
    date: &str,
    volatility: Option<f64>,
    news: &[NewsArticle],
) -> RecipeQuery {
    let mut question = match volatility {
        Some(value) => format!("Explain why {symbol} volatility was {value:.4} on {date}. "),
        None => format!("Explain the volatility of {symbol} on {date}. "),
    };
    question.push_str("Consider news, events, and market conditions.");
    push_headlines(&mut question, symbol, news);
    RecipeQuery { retrieval: format!("Volatility spike {symbol} {date}"), question }
}

pub(crate) fn sentiment(
    first: &str,
    second: &str,
    period: &str,
    first_news: &[NewsArticle],
    second_news: &[NewsArticle],
) -> RecipeQuery {
    let mut question = format!(
        "Compare market sentiment between {first} and {second} over {period}. \
         Include news sentiment, analyst opinions, and price trends."
    );
    push_headlines(&mut question, first, first_news);
    push_headlines(&mut question, second, second_news);
    RecipeQuery { retrieval: format!("Sentiment comparison {first} {second} {period}"), question }
}

pub(crate) fn pair(sector: &str) -> RecipeQuery {
    let question = format!(
        "Recommend a long/short pair trading strategy for the {sector} sector. \
         Identify one stock to go long and one to go short, with reasoning based on \
         fundamentals, technical analysis, and market sentiment. \
         Start your answer with the lines \"LONG: <ticker>\" and \"SHORT: <ticker>\"."
    );
    RecipeQuery { retrieval: format!("Pair trading recommendation {sector}"), question }
}

pub(crate) fn open_query(query: &str, symbols: &[String]) -> RecipeQuery {
    let question = if symbols.is_empty() {
        query.to_string()
    } else {
        format!("{query} (symbols: {})", symbols.join(", "))
    };
    RecipeQuery { retrieval: question.clone(), question }
}

fn push_headlines(question: &mut String, symbol: &str, news: &[NewsArticle]) {
    if news.is_empty() {
        return;
    }
    question.push_str(&format!("\nRecent {symbol} headlines:"));
    for article in news {
        question.push_str(&format!(
            "\n- {} ({}, {})",
            article.title, article.source, article.published_time
        ));
    }
}

/// Pull `LONG:` and `SHORT:` tickers out of a pair recommendation.
///
/// Matching is case-insensitive on the label and tolerates leading list
/// markers or bold markup. Returns `None` for a side that is not found.
pub(crate) fn parse_pair(answer: &str) -> (Option<String>, Option<String>) {
    let mut long = None;
    let mut short = None;
    for line in answer.lines() {
        let line = line.trim().trim_start_matches(['-', '*', ' ']);
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };
        let ticker = rest
            .trim()
            .trim_matches('*')
            .trim()
            .split(|c: char| c.is_whitespace() || c == ',' || c == '(')
            .next()
            .filter(|t| !t.is_empty())
            .map(|t| t.trim_end_matches('.').to_ascii_uppercase());
        match label.trim().trim_matches('*').to_ascii_lowercase().as_str() {
            "long" if long.is_none() => long = ticker,
            "short" if short.is_none() => short = ticker,
            _ => {}
        }
    }
    (long, short)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn context(id: &str, source: &str) -> ContextDocument {
        ContextDocument {
            doc_id: id.to_string(),
            content: format!("{id} body"),
            source: source.to_string(),
            timestamp: "2024-05-01T00:00:00Z".to_string(),
            similarity_score: 0.5,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn prompt_without_context_uses_fallback_instruction() {
        let prompt = augmented_prompt("What moved TSLA?", &[]);
        assert_eq!(prompt, format!("Query: What moved TSLA?\n\n{NO_CONTEXT_INSTRUCTION}\n"));
        assert!(!prompt.contains("[Document"));
    }

    #[test]
    fn prompt_lists_documents_in_rank_order() {
        let docs = [context("first", "reuters"), context("second", "sec")];
        let prompt = augmented_prompt("q", &docs);
        let expected = "Query: q\n\n\
            Context from financial data and news:\n\
            \n[Document 1]\nSource: reuters\nTimestamp: 2024-05-01T00:00:00Z\nContent: first body\n\
            \n[Document 2]\nSource: sec\nTimestamp: 2024-05-01T00:00:00Z\nContent: second body\n\
            \n\n";
        assert_eq!(prompt, format!("{expected}{WITH_CONTEXT_INSTRUCTION}\n"));
    }

    #[test]
    fn summary_wording_depends_on_quote() {
        let quote = Quote { price: 189.5, change_percent: -1.25 };
        let with = stock_summary("AAPL", "1M", Some(&quote));
        assert!(with.question.contains("Current price: $189.50 (-1.25%)."));
        let without = stock_summary("AAPL", "1M", None);
        assert!(!without.question.contains("Current price"));
        assert_eq!(without.retrieval, "Stock summary for AAPL over 1M");
    }

    #[test]
    fn volatility_folds_in_headlines() {
        let news = vec![NewsArticle {
            title: "Guidance cut".into(),
            source: "wire".into(),
            published_time: "2024-05-01".into(),
            ..NewsArticle::default()
        }];
        let query = volatility("NVDA", "2024-05-01", None, &news);
        assert!(query.question.starts_with("Explain the volatility of NVDA on 2024-05-01."));
        let headline = "Recent NVDA headlines:\n- Guidance cut (wire, 2024-05-01)";
        assert!(query.question.contains(headline));
    }

    #[test]
    fn open_query_mentions_symbols() {
        let query = open_query("Which chipmaker looks cheap?", &["AMD".into(), "INTC".into()]);
        assert_eq!(query.question, "Which chipmaker looks cheap? (symbols: AMD, INTC)");
        assert_eq!(open_query("plain", &[]).question, "plain");
    }

    #[test]
    fn parses_pair_lines() {
        let (long, short) = parse_pair("**LONG:** xom\n- Short: CVX (overvalued)\nLong: BP");
        assert_eq!(long.as_deref(), Some("XOM"));
        assert_eq!(short.as_deref(), Some("CVX"));
        assert_eq!(parse_pair("no tickers here"), (None, None));
    }
}
