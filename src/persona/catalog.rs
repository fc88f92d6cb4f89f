//! Persona catalog: personas, categories and prompt composition.
//!
//! The catalog is populated once (built-in definitions, YAML files, or
//! programmatic registration) and then shared read-only. Iteration order is
//! registration order; menus number their entries by it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{PersonaError, Result};
use crate::persona::prompt;
use crate::persona::record::PersonaRecord;

/// A category entry as it appears in YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub key: String,
    pub label: String,
}

/// YAML document accepted by [`PersonaCatalog::register_from_yaml`].
///
/// ```yaml
/// categories:
///   - key: future
///     label: Future
/// personas:
///   - key: edison
///     display_name: Thomas Edison
///     base_traits: |
///       You are Thomas Edison.
///     category_prompts:
///       future: |
///         Talk about practical invention.
/// ```
#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    categories: Vec<CategoryEntry>,
    #[serde(default)]
    personas: Vec<PersonaRecord>,
}

/// Insertion-ordered map with last-write-wins replacement.
#[derive(Debug, Clone)]
struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    fn insert(&mut self, key: String, value: V) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn validate(record: &PersonaRecord) -> Result<()> {
    if record.key.is_empty() {
        return Err(PersonaError::InvalidPersona(
            "persona key must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Owns persona and category definitions and composes prompts from them.
#[derive(Debug, Clone, Default)]
pub struct PersonaCatalog {
    personas: OrderedMap<Arc<PersonaRecord>>,
    categories: OrderedMap<String>,
}

impl PersonaCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Registration ---

    /// Insert or overwrite a persona by key.
    ///
    /// Overwriting keeps the persona's original position in listings.
    pub fn register_persona(&mut self, record: PersonaRecord) -> Result<()> {
        validate(&record)?;
        log::debug!("Registering persona '{}'", record.key);
        self.personas.insert(record.key.clone(), Arc::new(record));
        Ok(())
    }

    /// Insert or overwrite a category by key.
    pub fn register_category(&mut self, key: impl Into<String>, display_label: impl Into<String>) {
        self.categories.insert(key.into(), display_label.into());
    }

    /// Register every category and persona found in a YAML document.
    ///
    /// The whole document is validated before anything is registered, so a
    /// bad entry leaves the catalog unchanged. Categories are registered first
    /// so that personas in the same document may refer to them. Returns the
    /// number of personas registered.
    pub fn register_from_yaml(&mut self, content: &str) -> Result<usize> {
        let doc: CatalogDocument = serde_yaml::from_str(content)?;
        doc.personas.iter().try_for_each(validate)?;
        for category in doc.categories {
            self.register_category(category.key, category.label);
        }
        let count = doc.personas.len();
        for persona in doc.personas {
            self.register_persona(persona)?;
        }
        Ok(count)
    }

    /// Register a single YAML file.
    pub fn register_from_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        self.register_from_yaml(&content)
    }

    /// Load every `*.yaml` / `*.yml` file in a directory (recursive).
    ///
    /// Files that fail to parse are logged and skipped. Files are visited in
    /// path order so that registration order is reproducible.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        paths.sort();

        let mut count = 0;
        for path in paths {
            if path.is_dir() {
                count += self.load_directory(&path)?;
            } else if path
                .extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
            {
                match self.register_from_file(&path) {
                    Ok(n) => count += n,
                    Err(e) => {
                        log::warn!("Failed to load personas from {}: {}", path.display(), e);
                    }
                }
            }
        }
        Ok(count)
    }

    // --- Lookup ---

    /// Look up a persona by key.
    pub fn persona(&self, key: &str) -> Result<Arc<PersonaRecord>> {
        self.personas
            .get(key)
            .cloned()
            .ok_or_else(|| PersonaError::UnknownPersona(key.to_string()))
    }

    /// Look up a category's display label by key.
    pub fn category_label(&self, key: &str) -> Result<&str> {
        self.categories
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| PersonaError::UnknownCategory(key.to_string()))
    }

    /// `(key, display_name)` pairs in registration order.
    pub fn list_personas(&self) -> Vec<(String, String)> {
        self.personas
            .iter()
            .map(|(k, p)| (k.clone(), p.display_name.clone()))
            .collect()
    }

    /// `(key, display_label)` pairs in registration order.
    pub fn list_categories(&self) -> Vec<(String, String)> {
        self.categories
            .iter()
            .map(|(k, label)| (k.clone(), label.clone()))
            .collect()
    }

    /// All persona records in registration order.
    pub fn records(&self) -> Vec<Arc<PersonaRecord>> {
        self.personas.iter().map(|(_, p)| Arc::clone(p)).collect()
    }

    /// Personas with dedicated text for `category_key`, in registration order.
    pub fn experts_for(&self, category_key: &str) -> Vec<Arc<PersonaRecord>> {
        self.personas
            .iter()
            .filter(|(_, p)| p.covers_category(category_key))
            .map(|(_, p)| Arc::clone(p))
            .collect()
    }

    /// Number of registered personas.
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Whether no persona is registered.
    pub fn is_empty(&self) -> bool {
        self.personas.len() == 0
    }

    /// Number of registered categories.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    // --- Prompt composition ---

    /// Compose the system prompt for a persona speaking about a category.
    ///
    /// Both keys are checked independently. A known persona with no text for
    /// a known category gets the fallback sentence instead of an error.
    pub fn compose_category_prompt(&self, persona_key: &str, category_key: &str) -> Result<String> {
        let persona = self.persona(persona_key)?;
        let label = self.category_label(category_key)?;
        Ok(prompt::render_category_prompt(&persona, category_key, label))
    }

    /// Compose the problem-solving system prompt for a persona.
    pub fn compose_problem_solving_prompt(&self, persona_key: &str) -> Result<String> {
        let persona = self.persona(persona_key)?;
        Ok(prompt::render_problem_solving_prompt(&persona))
    }

    /// Compose the prompt for a category specialist consultation.
    pub fn compose_specialist_prompt(&self, persona_key: &str, category_key: &str) -> Result<String> {
        let persona = self.persona(persona_key)?;
        let label = self.category_label(category_key)?;
        Ok(prompt::render_specialist_prompt(&persona, category_key, label))
    }

    /// Compose the prompt for a persona competing in a battle.
    pub fn compose_battle_prompt(&self, persona_key: &str) -> Result<String> {
        let persona = self.persona(persona_key)?;
        Ok(prompt::render_battle_prompt(&persona))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_catalog() -> PersonaCatalog {
        let mut catalog = PersonaCatalog::new();
        catalog.register_category("x", "X");
        catalog
            .register_persona(PersonaRecord::new("alpha", "Alpha", "You are Alpha."))
            .unwrap();
        catalog
            .register_persona(
                PersonaRecord::new("beta", "Beta", "You are Beta.").category_prompt("x", "Beta on X."),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_fallback_when_persona_lacks_category() {
        let catalog = sample_catalog();
        let prompt = catalog.compose_category_prompt("alpha", "x").unwrap();
        assert_eq!(prompt, "You are Alpha.\n\nAnswer professionally about X.");
    }

    #[test]
    fn test_specific_category_text() {
        let catalog = sample_catalog();
        let prompt = catalog.compose_category_prompt("beta", "x").unwrap();
        assert_eq!(prompt, "You are Beta.\n\nBeta on X.");
    }

    #[test]
    fn test_unknown_keys_fail_independently() {
        let catalog = sample_catalog();
        assert!(matches!(
            catalog.compose_category_prompt("ghost", "x"),
            Err(PersonaError::UnknownPersona(k)) if k == "ghost"
        ));
        assert!(matches!(
            catalog.compose_category_prompt("alpha", "y"),
            Err(PersonaError::UnknownCategory(k)) if k == "y"
        ));
        // Persona is checked first when both are unknown.
        assert!(matches!(
            catalog.compose_category_prompt("ghost", "y"),
            Err(PersonaError::UnknownPersona(_))
        ));
        assert!(matches!(
            catalog.compose_problem_solving_prompt("ghost"),
            Err(PersonaError::UnknownPersona(_))
        ));
    }

    #[test]
    fn test_last_write_wins() {
        let mut catalog = sample_catalog();
        catalog
            .register_persona(PersonaRecord::new("alpha", "Alpha v2", "You are Alpha, again."))
            .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.persona("alpha").unwrap().display_name, "Alpha v2");
        // Position in the listing is unchanged.
        assert_eq!(catalog.list_personas()[0].0, "alpha");

        catalog.register_category("x", "Ex");
        assert_eq!(catalog.category_count(), 1);
        assert_eq!(catalog.category_label("x").unwrap(), "Ex");
    }

    #[test]
    fn test_listing_order_is_insertion_order() {
        let mut catalog = PersonaCatalog::new();
        for key in ["zeta", "alpha", "mu"] {
            catalog
                .register_persona(PersonaRecord::new(key, key.to_uppercase(), "traits"))
                .unwrap();
            catalog.register_category(key, key);
        }
        let keys: Vec<_> = catalog.list_personas().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mu"]);
        assert_eq!(catalog.list_personas(), catalog.list_personas());

        let cats: Vec<_> = catalog.list_categories().into_iter().map(|(k, _)| k).collect();
        assert_eq!(cats, vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut catalog = PersonaCatalog::new();
        let err = catalog
            .register_persona(PersonaRecord::new("", "Nobody", "traits"))
            .unwrap_err();
        assert!(matches!(err, PersonaError::InvalidPersona(_)));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_experts_for() {
        let catalog = sample_catalog();
        let experts: Vec<_> = catalog.experts_for("x").iter().map(|p| p.key.clone()).collect();
        assert_eq!(experts, vec!["beta"]);
        assert!(catalog.experts_for("nothing").is_empty());
    }

    #[test]
    fn test_register_from_yaml() {
        let yaml = r#"
categories:
  - key: future
    label: Future
personas:
  - key: edison
    display_name: Thomas Edison
    base_traits: You are Edison.
    strengths: [technical, creative]
    category_prompts:
      future: Invent it.
"#;
        let mut catalog = PersonaCatalog::new();
        assert_eq!(catalog.register_from_yaml(yaml).unwrap(), 1);
        assert_eq!(
            catalog.compose_category_prompt("edison", "future").unwrap(),
            "You are Edison.\n\nInvent it."
        );
    }

    #[test]
    fn test_invalid_document_registers_nothing() {
        let yaml = r#"
categories:
  - key: future
    label: Future
personas:
  - key: edison
    display_name: Thomas Edison
    base_traits: You are Edison.
  - key: ""
    display_name: Nobody
    base_traits: You are nobody.
"#;
        let mut catalog = PersonaCatalog::new();
        let err = catalog.register_from_yaml(yaml).unwrap_err();
        assert!(matches!(err, PersonaError::InvalidPersona(_)));
        assert!(catalog.is_empty());
        assert_eq!(catalog.category_count(), 0);
    }

    #[test]
    fn test_load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();

        let mut good = std::fs::File::create(dir.path().join("a.yaml")).unwrap();
        writeln!(
            good,
            "personas:\n  - key: ryoma\n    display_name: Sakamoto Ryoma\n    base_traits: You are Ryoma."
        )
        .unwrap();
        std::fs::write(dir.path().join("b.yml"), "personas: [not: {valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut catalog = PersonaCatalog::new();
        assert_eq!(catalog.load_directory(dir.path()).unwrap(), 1);
        assert!(catalog.persona("ryoma").is_ok());

        assert_eq!(
            catalog.load_directory(&dir.path().join("missing")).unwrap(),
            0
        );
    }
}
