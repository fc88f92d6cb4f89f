//! Runtime settings read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `OPENAI_API_KEY` | required |
//! | `PERSONA_SIM_MODEL` | `gpt-4o` |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
//! | `PERSONA_SIM_TIMEOUT_SECS` | `120` |
//! | `PERSONA_SIM_CATALOG_DIR` | unset (built-in personas only) |
//! | `PERSONA_SIM_COLOR` | on; `0`, `false` or `no` disables |
//!
//! A `.env` file in the working directory is honored (see [`load_dotenv`]).

use std::path::PathBuf;

use crate::error::LlmError;
use crate::llm::{self, LLM};

pub const MODEL_ENV: &str = "PERSONA_SIM_MODEL";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const TIMEOUT_ENV: &str = "PERSONA_SIM_TIMEOUT_SECS";
pub const CATALOG_DIR_ENV: &str = "PERSONA_SIM_CATALOG_DIR";
pub const COLOR_ENV: &str = "PERSONA_SIM_COLOR";

/// Load `.env` into the process environment, if present.
///
/// Variables already set in the environment take precedence.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: f64,
    pub catalog_dir: Option<PathBuf>,
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: llm::DEFAULT_MODEL.to_string(),
            base_url: llm::DEFAULT_BASE_URL.to_string(),
            timeout_secs: llm::DEFAULT_TIMEOUT_SECS,
            catalog_dir: None,
            color: true,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let timeout_secs = match get(TIMEOUT_ENV) {
            Some(raw) => match raw.parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs > 0.0 => secs,
                _ => {
                    log::warn!(
                        "Ignoring invalid {}={:?}; using {}s",
                        TIMEOUT_ENV,
                        raw,
                        defaults.timeout_secs
                    );
                    defaults.timeout_secs
                }
            },
            None => defaults.timeout_secs,
        };

        let color = get(COLOR_ENV).map_or(defaults.color, |v| {
            !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
        });

        Self {
            api_key: get(llm::API_KEY_ENV),
            model: get(MODEL_ENV).unwrap_or(defaults.model),
            base_url: get(BASE_URL_ENV).unwrap_or(defaults.base_url),
            timeout_secs,
            catalog_dir: get(CATALOG_DIR_ENV).map(PathBuf::from),
            color,
        }
    }

    /// Fail with [`LlmError::MissingCredential`] when no API key is set.
    pub fn require_api_key(&self) -> Result<&str, LlmError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| LlmError::MissingCredential(llm::API_KEY_ENV.to_string()))
    }

    /// Model configuration derived from these settings.
    pub fn llm(&self) -> LLM {
        let mut config = LLM::new(self.model.clone())
            .base_url(self.base_url.clone())
            .timeout(self.timeout_secs);
        if let Some(key) = &self.api_key {
            config = config.api_key(key.clone());
        }
        config
    }
}

/// Remediation text shown when the API key is missing.
pub fn missing_key_help() -> String {
    format!(
        "Error: {key} is not set.\n\n\
         Set it in your shell:\n    export {key}=\"sk-...\"\n\
         or add it to a .env file in the working directory:\n    {key}=sk-...\n\n\
         Optionally choose a model with {model} (default {default_model}).",
        key = llm::API_KEY_ENV,
        model = MODEL_ENV,
        default_model = llm::DEFAULT_MODEL
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]);
        assert_eq!(s, Settings::default());
        assert!(matches!(s.require_api_key(), Err(LlmError::MissingCredential(_))));
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PERSONA_SIM_MODEL", "gpt-4o-mini"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
            ("PERSONA_SIM_TIMEOUT_SECS", "30"),
            ("PERSONA_SIM_CATALOG_DIR", "/etc/personas"),
            ("PERSONA_SIM_COLOR", "0"),
        ]);
        assert_eq!(s.require_api_key().unwrap(), "sk-test");
        assert_eq!(s.model, "gpt-4o-mini");
        assert_eq!(s.timeout_secs, 30.0);
        assert_eq!(s.catalog_dir, Some(PathBuf::from("/etc/personas")));
        assert!(!s.color);

        let llm = s.llm();
        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.base_url, "http://localhost:11434/v1");
        assert!(llm.has_api_key());
    }

    #[test]
    fn test_blank_and_invalid_values() {
        let s = settings(&[
            ("OPENAI_API_KEY", "   "),
            ("PERSONA_SIM_TIMEOUT_SECS", "soon"),
            ("PERSONA_SIM_COLOR", "yes"),
        ]);
        assert!(s.api_key.is_none());
        assert_eq!(s.timeout_secs, 120.0);
        assert!(s.color);

        assert_eq!(settings(&[("PERSONA_SIM_TIMEOUT_SECS", "-5")]).timeout_secs, 120.0);
    }

    #[test]
    fn test_missing_key_help_mentions_variable() {
        assert!(missing_key_help().contains("export OPENAI_API_KEY"));
    }
}
