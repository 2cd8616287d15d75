//! OpenAI embedding and generation providers.
//!
//! This module is only available when the `openai` feature is enabled.
//! Both providers call the REST API directly with `reqwest` and classify
//! failures into [`ProviderErrorKind`]s:
//!
//! | Condition | Kind |
//! |---|---|
//! | 401 / 403 | [`ProviderErrorKind::Auth`] |
//! | 429 | [`ProviderErrorKind::RateLimit`] |
//! | other non-success status, transport error | [`ProviderErrorKind::Network`] |
//! | undecodable or incomplete body | [`ProviderErrorKind::MalformedResponse`] |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{ProviderErrorKind, RagError, Result};
use crate::generation::{GenerationProvider, GenerationRequest};

/// The default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// The default model for OpenAI embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// The default chat model for answers.
const DEFAULT_CHAT_MODEL: &str = "gpt-4";

/// Request timeout applied by both providers.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const PROVIDER: &str = "OpenAI";

fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build().map_err(|e| {
        let message = format!("client setup failed: {e}");
        RagError::provider(PROVIDER, ProviderErrorKind::Network, message)
    })
}

fn api_key_from_env() -> Result<String> {
    std::env::var("OPENAI_API_KEY").map_err(|_| {
        RagError::provider(
            PROVIDER,
            ProviderErrorKind::Auth,
            "OPENAI_API_KEY environment variable not set",
        )
    })
}

fn check_api_key(api_key: &str) -> Result<()> {
    if api_key.is_empty() {
        return Err(RagError::provider(
            PROVIDER,
            ProviderErrorKind::Auth,
            "API key must not be empty",
        ));
    }
    Ok(())
}

fn classify_status(status: StatusCode) -> ProviderErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderErrorKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => ProviderErrorKind::RateLimit,
        _ => ProviderErrorKind::Network,
    }
}

/// POST `body` to `url` and decode a successful JSON response.
async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<R> {
    let response = client.post(url).bearer_auth(api_key).json(body).send().await.map_err(|e| {
        error!(provider = PROVIDER, error = %e, "request failed");
        RagError::provider(PROVIDER, ProviderErrorKind::Network, format!("request failed: {e}"))
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail =
            serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);

        error!(provider = PROVIDER, %status, "API error");
        return Err(RagError::provider(
            PROVIDER,
            classify_status(status),
            format!("API returned {status}: {detail}"),
        ));
    }

    response.json::<R>().await.map_err(|e| {
        error!(provider = PROVIDER, error = %e, "failed to parse response");
        RagError::provider(
            PROVIDER,
            ProviderErrorKind::MalformedResponse,
            format!("failed to parse response: {e}"),
        )
    })
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `base_url` – defaults to `https://api.openai.com/v1`; point it at any
///   OpenAI-compatible server.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
///
/// # Example
///
/// ```rust,ignore
/// use quant_rag::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::new("sk-...")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-3-small`) and dimensions (1536).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        check_api_key(&api_key)?;
        Ok(Self {
            client: build_client()?,
            api_key,
            base_url: OPENAI_BASE_URL.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(api_key_from_env()?)
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL, without a trailing `/embeddings`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// When set, the API returns embeddings truncated to this size.
    /// This also updates the value returned by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| {
            let kind = ProviderErrorKind::MalformedResponse;
            RagError::provider(PROVIDER, kind, "API returned no data")
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.request_dimensions,
        };
        let url = format!("{}/embeddings", self.base_url);
        let response: EmbeddingResponse =
            post_json(&self.client, &url, &self.api_key, &request_body).await?;

        if response.data.len() != texts.len() {
            return Err(RagError::provider(
                PROVIDER,
                ProviderErrorKind::MalformedResponse,
                format!("requested {} embeddings, received {}", texts.len(), response.data.len()),
            ));
        }

        // The API documents `index`; keep input order even if items arrive shuffled.
        let mut data = response.data;
        if data.iter().all(|d| d.index.is_some()) {
            data.sort_by_key(|d| d.index);
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat completions ───────────────────────────────────────────────

/// A [`GenerationProvider`] backed by the OpenAI chat completions API.
///
/// Sends the system instruction and the prompt as a two-message
/// conversation and returns the first choice's content.
pub struct OpenAIGenerationProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIGenerationProvider {
    /// Create a new provider with the given API key and the `gpt-4` model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        check_api_key(&api_key)?;
        Ok(Self {
            client: build_client()?,
            api_key,
            base_url: OPENAI_BASE_URL.into(),
            model: DEFAULT_CHAT_MODEL.into(),
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(api_key_from_env()?)
    }

    /// Set the chat model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL, without a trailing `/chat/completions`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl GenerationProvider for OpenAIGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %self.model,
            prompt_len = request.prompt.len(),
            "requesting chat completion"
        );

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &request.system_instruction },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        let url = format!("{}/chat/completions", self.base_url);
        let response: ChatResponse = post_json(&self.client, &url, &self.api_key, &body).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| {
                RagError::provider(
                    PROVIDER,
                    ProviderErrorKind::MalformedResponse,
                    "response contained no choices",
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), ProviderErrorKind::Auth);
        assert_eq!(classify_status(StatusCode::FORBIDDEN), ProviderErrorKind::Auth);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), ProviderErrorKind::RateLimit);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), ProviderErrorKind::Network);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = OpenAIEmbeddingProvider::new("").err().unwrap();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Auth));
        assert!(OpenAIGenerationProvider::new("").is_err());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let provider = OpenAIEmbeddingProvider::new("sk-test")
            .unwrap()
            .with_base_url("http://localhost:1/v1/");
        assert_eq!(provider.base_url, "http://localhost:1/v1");
    }
}
