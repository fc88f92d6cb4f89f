//! LLM provider layer.
//!
//! - [`base_llm`] - The trait every chat-completion provider implements
//! - [`providers`] - Concrete providers (OpenAI-compatible chat completions)

pub mod base_llm;
pub mod providers;

// Re-exports for convenience
pub use base_llm::{BaseLLM, ChatMessage, ChatRole};
