//! Built-in personas, categories, scenario questions and discussion topics.
//!
//! The data lives in YAML files under `data/` and is embedded at compile time,
//! so the binary works without any files on disk.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Result;
use crate::persona::catalog::PersonaCatalog;

const PERSONAS_YAML: &str = include_str!("../../data/personas.yaml");
const SCENARIOS_YAML: &str = include_str!("../../data/scenarios.yaml");

impl PersonaCatalog {
    /// Catalog preloaded with the built-in personas and categories.
    pub fn with_defaults() -> Result<Self> {
        let mut catalog = Self::new();
        let count = catalog.register_from_yaml(PERSONAS_YAML)?;
        log::debug!(
            "Loaded {} built-in personas and {} categories",
            count,
            catalog.category_count()
        );
        Ok(catalog)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CategoryScenario {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    questions: Vec<String>,
}

/// Canned questions and discussion topics keyed by category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenarios {
    fallback_topic: String,
    #[serde(default)]
    categories: HashMap<String, CategoryScenario>,
}

impl Scenarios {
    /// The built-in scenario set.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(SCENARIOS_YAML)
    }

    /// Parse a scenario document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Questions for a category; empty when none are defined.
    pub fn questions(&self, category_key: &str) -> &[String] {
        self.categories
            .get(category_key)
            .map(|c| c.questions.as_slice())
            .unwrap_or(&[])
    }

    /// Discussion topic for a category, or the generic fallback topic.
    pub fn discussion_topic(&self, category_key: &str) -> &str {
        self.categories
            .get(category_key)
            .and_then(|c| c.topic.as_deref())
            .unwrap_or(&self.fallback_topic)
    }
}
