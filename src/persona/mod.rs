//! Persona system: figures, categories and prompt composition.
//!
//! # Architecture
//!
//! ```text
//! PersonaRecord (identity + per-category text + framework)
//!   ↓  register
//! PersonaCatalog (ordered personas, ordered categories)
//!   ↓  compose_*_prompt
//! system prompt String  →  AgentFactory::create_agent
//! ```
//!
//! Records are immutable once registered; the catalog hands out `Arc`s.

pub mod builtin;
pub mod catalog;
pub mod prompt;
pub mod record;

// Re-exports
pub use builtin::Scenarios;
pub use catalog::{CategoryEntry, PersonaCatalog};
pub use record::{PersonaRecord, ProblemSolvingFramework, ProblemType};
