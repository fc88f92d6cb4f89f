//! Agent construction.
//!
//! Console flows never build agents directly; they ask an [`AgentFactory`]
//! so tests can substitute scripted agents for model-backed ones.

use std::sync::Arc;

use crate::agent::core::{AssistantAgent, ChatAgent};
use crate::llms::base_llm::BaseLLM;

/// Turns a name and a composed system prompt into a [`ChatAgent`].
pub trait AgentFactory: Send + Sync {
    fn create_agent(&self, name: &str, system_prompt: &str) -> Arc<dyn ChatAgent>;
}

/// Builds [`AssistantAgent`]s that share one provider.
#[derive(Debug, Clone)]
pub struct LlmAgentFactory {
    llm: Arc<dyn BaseLLM>,
}

impl LlmAgentFactory {
    pub fn new(llm: Arc<dyn BaseLLM>) -> Self {
        Self { llm }
    }
}

impl AgentFactory for LlmAgentFactory {
    fn create_agent(&self, name: &str, system_prompt: &str) -> Arc<dyn ChatAgent> {
        log::debug!("Creating agent '{}' on model '{}'", name, self.llm.model());
        Arc::new(AssistantAgent::new(name, system_prompt, Arc::clone(&self.llm)))
    }
}
