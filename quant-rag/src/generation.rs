//! Generation provider trait for producing answers from prompts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single text generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// The user prompt, including any retrieved context.
    pub prompt: String,
    /// The system instruction framing the assistant's role.
    pub system_instruction: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// A provider that turns a prompt into generated text.
///
/// The pipeline treats the provider as opaque: it owns prompt construction
/// only. An empty string is a legal return value here, but the pipeline
/// treats it as a failed generation.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate text for the given request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
