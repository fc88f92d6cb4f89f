//! Error types for persona-sim.
//!
//! Catalog lookups fail with [`PersonaError`], calls to the chat-completion
//! collaborator fail with [`LlmError`], and the console session folds both
//! into [`SessionError`] at its outermost loop.

use thiserror::Error;

/// Errors raised by the persona catalog.
#[derive(Debug, Error)]
pub enum PersonaError {
    /// No persona is registered under this key.
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    /// No category is registered under this key.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// A persona record failed validation on registration.
    #[error("Invalid persona: {0}")]
    InvalidPersona(String),

    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error while loading persona definitions.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the chat-completion collaborator.
///
/// None of these are retried; they travel up to the session loop untouched.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider credential is not configured.
    #[error("{0} is not set")]
    MissingCredential(String),

    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The provider answered 2xx but the body could not be understood.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Any other upstream failure.
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl From<serde_json::Error> for LlmError {
    fn from(e: serde_json::Error) -> Self {
        LlmError::MalformedResponse(e.to_string())
    }
}

/// Errors that end a single console flow and return control to the main menu.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Catalog misuse (unknown key).
    #[error(transparent)]
    Persona(#[from] PersonaError),

    /// Upstream failure from an agent or team.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Console I/O failure.
    #[error("Console IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, PersonaError>;
