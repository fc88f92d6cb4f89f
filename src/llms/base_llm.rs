//! Base trait for chat-completion providers.
//!
//! Providers receive the full message list for a conversation and return the
//! assistant's reply text. Conversation state lives with the caller (see
//! [`crate::agent::AssistantAgent`]), so providers are stateless and shareable.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// BaseLLM trait
// ---------------------------------------------------------------------------

/// Interface every chat-completion provider implements.
///
/// Implementations must not retry; any failure is returned to the caller
/// as an [`LlmError`].
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Get the model identifier/name.
    fn model(&self) -> &str;

    /// Get the provider name.
    fn provider(&self) -> &str {
        "openai"
    }

    /// Send `messages` and return the reply text.
    async fn acall(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}
