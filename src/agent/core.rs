//! Chat agents.
//!
//! A [`ChatAgent`] is the single seam between the console flows and the
//! language model: it takes a task string and returns a reply. The
//! [`AssistantAgent`] implementation keeps its own conversation memory so
//! that repeated calls form one continuous conversation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::LlmError;
use crate::llms::base_llm::{BaseLLM, ChatMessage};

/// An agent that answers tasks.
#[async_trait]
pub trait ChatAgent: Send + Sync + fmt::Debug {
    /// Stable agent name, used to attribute messages in multi-agent flows.
    fn name(&self) -> &str;

    /// Answer `task`. The only failure is an upstream one, returned untouched.
    async fn respond(&self, task: &str) -> Result<String, LlmError>;
}

/// [`ChatAgent`] backed by a [`BaseLLM`] with a fixed system prompt.
pub struct AssistantAgent {
    name: String,
    system_prompt: String,
    llm: Arc<dyn BaseLLM>,
    /// Prior user/assistant turns, oldest first.
    history: Mutex<Vec<ChatMessage>>,
}

impl fmt::Debug for AssistantAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantAgent")
            .field("name", &self.name)
            .field("model", &self.llm.model())
            .field("turns", &self.history.lock().len())
            .finish()
    }
}

impl AssistantAgent {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        llm: Arc<dyn BaseLLM>,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            llm,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Snapshot of the conversation so far, excluding the system prompt.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().clone()
    }

    /// Forget all prior turns.
    pub fn reset(&self) {
        self.history.lock().clear();
    }

    fn build_messages(&self, task: &str) -> Vec<ChatMessage> {
        let history = self.history.lock();
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(task));
        messages
    }
}

#[async_trait]
impl ChatAgent for AssistantAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, task: &str) -> Result<String, LlmError> {
        let messages = self.build_messages(task);
        log::debug!("Agent '{}' sending {} messages", self.name, messages.len());

        let reply = self.llm.acall(&messages).await?;

        // A failed call leaves the history untouched.
        let mut history = self.history.lock();
        history.push(ChatMessage::user(task));
        history.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }
}
