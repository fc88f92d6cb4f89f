//! OpenAI-compatible chat-completions provider.
//!
//! Posts the conversation to `{base_url}/chat/completions` with bearer auth
//! and returns the first choice's message content. Any endpoint speaking the
//! same wire format (local gateways, proxies) works by changing the base URL.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LlmError;
use crate::llm::LLM;
use crate::llms::base_llm::{BaseLLM, ChatMessage};

/// Largest slice of a response body kept in error messages.
const ERROR_BODY_LIMIT: usize = 500;

/// OpenAI chat-completions implementation of [`BaseLLM`].
#[derive(Debug, Clone)]
pub struct OpenAICompletion {
    model: String,
    api_key: String,
    base_url: String,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl OpenAICompletion {
    /// Create a provider from an [`LLM`] configuration.
    pub fn new(config: &LLM) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingCredential(crate::llm::API_KEY_ENV.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout.max(0.0)))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    /// Chat-completions endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, messages: &[ChatMessage]) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temp) = self.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    /// Extract the reply text from a Chat Completions API response.
    pub fn parse_completions_response(response: &Value) -> Result<String, LlmError> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| LlmError::MalformedResponse("no choices in response".to_string()))?;

        let content = message
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or("");

        if let Some(usage) = response.get("usage") {
            log::debug!(
                "OpenAI token usage: prompt={}, completion={}, total={}",
                usage.get("prompt_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("completion_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("total_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
            );
        }

        Ok(content.to_string())
    }
}

/// Cut `text` to at most `limit` bytes on a char boundary.
fn truncate_body(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[async_trait]
impl BaseLLM for OpenAICompletion {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        "openai"
    }

    async fn acall(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        log::debug!(
            "OpenAICompletion.acall: model={}, messages={}",
            self.model,
            messages.len(),
        );

        let body = self.build_request_body(messages);
        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            log::warn!("OpenAI API returned {}", status);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: truncate_body(&response_text, ERROR_BODY_LIMIT).to_string(),
            });
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::MalformedResponse(format!(
                "{} - Body: {}",
                e,
                truncate_body(&response_text, ERROR_BODY_LIMIT)
            ))
        })?;

        Self::parse_completions_response(&response_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAICompletion {
        OpenAICompletion::new(
            &LLM::new("gpt-4o")
                .api_key("sk-test")
                .base_url("http://localhost:9999/v1/")
                .temperature(0.7),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(provider().endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_request_body() {
        let body = provider().build_request_body(&[
            ChatMessage::system("You are Edison."),
            ChatMessage::user("Hello"),
        ]);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hello");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_response() {
        let response = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Keep trying."}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        });
        assert_eq!(
            OpenAICompletion::parse_completions_response(&response).unwrap(),
            "Keep trying."
        );
    }

    #[test]
    fn test_parse_response_without_choices() {
        let err = OpenAICompletion::parse_completions_response(&serde_json::json!({"choices": []}))
            .unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_key() {
        let err = OpenAICompletion::new(&LLM::new("gpt-4o")).unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential(_)));
    }

    #[test]
    fn test_truncate_body_respects_char_boundary() {
        assert_eq!(truncate_body("abc", 10), "abc");
        assert_eq!(truncate_body("héllo", 2), "h");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let provider = OpenAICompletion::new(
            &LLM::new("gpt-4o")
                .api_key("sk-test")
                .base_url("http://127.0.0.1:1")
                .timeout(2.0),
        )
        .unwrap();
        let err = provider.acall(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
    }
}
