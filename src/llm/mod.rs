//! Language-model configuration.
//!
//! The [`LLM`] struct holds what is needed to talk to a chat-completion
//! endpoint: model identifier, credential, base URL, timeout and sampling
//! temperature. It does not call anything itself; [`LLM::build`] turns it into
//! a provider implementing [`BaseLLM`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llms::base_llm::BaseLLM;
use crate::llms::providers::openai::OpenAICompletion;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat-completion model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLM {
    /// Model identifier (e.g., "gpt-4o").
    pub model: String,
    /// API key for bearer authentication.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Timeout for API calls in seconds.
    pub timeout: f64,
    /// Sampling temperature; provider default when unset.
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,
}

impl Default for LLM {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl LLM {
    /// Create a configuration for `model` with default endpoint settings.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    // --- Builder-style setters ---

    /// Set the temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL. A trailing slash is dropped.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the timeout in seconds.
    pub fn timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Whether a non-blank API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map_or(false, |k| !k.trim().is_empty())
    }

    /// Build the provider for this configuration.
    ///
    /// Fails with [`LlmError::MissingCredential`] when no API key is set.
    pub fn build(&self) -> Result<Arc<dyn BaseLLM>, LlmError> {
        if !self.has_api_key() {
            return Err(LlmError::MissingCredential(API_KEY_ENV.to_string()));
        }
        let provider = OpenAICompletion::new(self)?;
        log::debug!(
            "Built {} provider for model '{}'",
            provider.provider(),
            self.model
        );
        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let llm = LLM::default();
        assert_eq!(llm.model, "gpt-4o");
        assert_eq!(llm.base_url, "https://api.openai.com/v1");
        assert_eq!(llm.timeout, 120.0);
        assert!(llm.temperature.is_none());
    }

    #[test]
    fn test_builder() {
        let llm = LLM::new("gpt-4o-mini")
            .api_key("sk-test")
            .base_url("http://localhost:8080/v1/")
            .timeout(5.0)
            .temperature(0.2)
            .max_tokens(256);
        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.base_url, "http://localhost:8080/v1");
        assert_eq!(llm.timeout, 5.0);
        assert_eq!(llm.temperature, Some(0.2));
        assert_eq!(llm.max_tokens, Some(256));
        assert!(llm.has_api_key());
    }

    #[test]
    fn test_build_without_key_fails() {
        let err = LLM::new("gpt-4o").build().unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential(ref v) if v == "OPENAI_API_KEY"));

        let err = LLM::new("gpt-4o").api_key("   ").build().unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential(_)));
    }

    #[test]
    fn test_build_with_key() {
        let provider = LLM::new("gpt-4o").api_key("sk-test").build().unwrap();
        assert_eq!(provider.model(), "gpt-4o");
        assert_eq!(provider.provider(), "openai");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let json = serde_json::to_string(&LLM::new("gpt-4o").api_key("sk-secret")).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
