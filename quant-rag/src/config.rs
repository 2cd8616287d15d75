//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default system instruction sent with every generation request.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a quantitative trading analyst assistant. \
     Provide concise, data-driven insights based on the provided context.";

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Number of context documents retrieved for stock summaries.
    pub summary_top_k: usize,
    /// Number of context documents retrieved by every other recipe.
    pub top_k: usize,
    /// Maximum number of headlines folded into a recipe prompt per ticker.
    pub news_limit: usize,
    /// Sampling temperature passed to the generation provider.
    pub temperature: f32,
    /// Token budget passed to the generation provider.
    pub max_tokens: u32,
    /// System instruction passed to the generation provider.
    pub system_instruction: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            summary_top_k: 5,
            top_k: 10,
            news_limit: 10,
            temperature: 0.7,
            max_tokens: 1000,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    ///
    /// ```toml
    /// top_k = 8
    /// temperature = 0.2
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the document does not parse or
    /// fails validation.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: RagConfig = toml::from_str(source)
            .map_err(|e| RagError::ConfigError(format!("invalid TOML: {e}")))?;
        RagConfigBuilder { config }.build()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the number of documents retrieved for stock summaries.
    pub fn summary_top_k(mut self, k: usize) -> Self {
        self.config.summary_top_k = k;
        self
    }

    /// Set the number of documents retrieved by the other recipes.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the maximum number of headlines per ticker.
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.config.news_limit = limit;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the generation token budget.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the system instruction.
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.system_instruction = instruction.into();
        self
    }

    /// Build the [`RagConfig`], validating that parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `top_k == 0` or `summary_top_k == 0`
    /// - `max_tokens == 0`
    /// - `temperature` is outside `0.0..=2.0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.top_k == 0 || self.config.summary_top_k == 0 {
            return Err(RagError::ConfigError("top_k values must be greater than zero".to_string()));
        }
        if self.config.max_tokens == 0 {
            return Err(RagError::ConfigError("max_tokens must be greater than zero".to_string()));
        }
        if !(0.0..=2.0).contains(&self.config.temperature) {
            return Err(RagError::ConfigError(format!(
                "temperature ({}) must be within 0.0..=2.0",
                self.config.temperature
            )));
        }
        Ok(self.config)
    }
}
