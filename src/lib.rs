//! # persona-sim
//!
//! Console simulation of historical and fictional personas answering
//! questions, debating each other and working through problems.
//!
//! Personas live in a [`PersonaCatalog`]; every agent gets a system prompt
//! composed from the catalog and talks to a chat-completion model through
//! [`BaseLLM`]. The [`ConsoleSession`] ties it together behind a numbered
//! menu with six modes:
//!
//! - single-persona chat and scripted scenario questions
//! - round-robin discussions between three personas ([`team`])
//! - four-stage problem solving and judged battles ([`problem_solving`])
//! - consultations with the experts of one category

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod llms;
pub mod persona;
pub mod problem_solving;
pub mod session;
pub mod team;
pub mod utilities;

pub use agent::{AgentFactory, AssistantAgent, ChatAgent, LlmAgentFactory};
pub use config::Settings;
pub use error::{LlmError, PersonaError, SessionError};
pub use llm::LLM;
pub use llms::base_llm::BaseLLM;
pub use persona::{PersonaCatalog, PersonaRecord, Scenarios};
pub use problem_solving::{ProblemSolvingBattle, ProblemSolvingSession};
pub use session::ConsoleSession;
pub use team::{RoundRobinTeam, TurnCoordinator};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
