//! Chat agents and their construction.
//!
//! - [`core`] - the [`ChatAgent`] trait and the model-backed [`AssistantAgent`]
//! - [`factory`] - [`AgentFactory`] and [`LlmAgentFactory`]
//! - [`names`] - deterministic agent names per mode

pub mod core;
pub mod factory;
pub mod names;

pub use self::core::{AssistantAgent, ChatAgent};
pub use self::factory::{AgentFactory, LlmAgentFactory};
