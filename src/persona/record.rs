//! Persona records and their problem-solving metadata.
//!
//! A [`PersonaRecord`] is plain data: identity text, per-category text, and an
//! optional [`ProblemSolvingFramework`]. Records are deserialized from YAML
//! (see [`crate::persona::builtin`]) or built in code with the builder-style
//! setters below.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ProblemType
// ---------------------------------------------------------------------------

/// Problem-type tags used to describe what a persona is strong at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    Strategic,
    Operational,
    Technical,
    Human,
    Financial,
    Creative,
    Analytical,
    Ethical,
}

impl ProblemType {
    /// Every variant, in declaration order.
    pub const ALL: [ProblemType; 8] = [
        ProblemType::Strategic,
        ProblemType::Operational,
        ProblemType::Technical,
        ProblemType::Human,
        ProblemType::Financial,
        ProblemType::Creative,
        ProblemType::Analytical,
        ProblemType::Ethical,
    ];

    /// Human-readable label used when rendering prompts and menus.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Strategic => "Strategic problems",
            Self::Operational => "Operational problems",
            Self::Technical => "Technical problems",
            Self::Human => "Human problems",
            Self::Financial => "Financial problems",
            Self::Creative => "Creative challenges",
            Self::Analytical => "Analytical challenges",
            Self::Ethical => "Ethical problems",
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// ProblemSolvingFramework
// ---------------------------------------------------------------------------

/// A named, ordered method a persona applies to problems.
///
/// All list fields are opaque strings; their order is preserved verbatim in
/// rendered prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSolvingFramework {
    /// Name of the method.
    pub name: String,
    /// Ordered steps.
    #[serde(default)]
    pub steps: Vec<String>,
    /// Questions the persona asks itself.
    #[serde(default)]
    pub key_questions: Vec<String>,
    /// Criteria used to judge candidate solutions.
    #[serde(default)]
    pub evaluation_criteria: Vec<String>,
    /// Tools and techniques the method relies on.
    #[serde(default)]
    pub tools: Vec<String>,
}

// ---------------------------------------------------------------------------
// PersonaRecord
// ---------------------------------------------------------------------------

/// Static description of one persona.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaRecord {
    /// Unique key, also used to derive agent names.
    pub key: String,
    /// Label shown in menus and transcripts.
    pub display_name: String,
    /// Identity and voice; always the first block of a composed prompt.
    pub base_traits: String,
    /// Persona-specific framing per category key.
    #[serde(default)]
    pub category_prompts: BTreeMap<String, String>,
    #[serde(default)]
    pub problem_solving_framework: Option<ProblemSolvingFramework>,
    #[serde(default)]
    pub problem_solving_style: Option<String>,
    #[serde(default)]
    pub strengths: Vec<ProblemType>,
    #[serde(default)]
    pub decision_making_process: Option<String>,
    #[serde(default)]
    pub signature_techniques: Vec<String>,
}

impl PersonaRecord {
    /// Create a record with only the mandatory fields set.
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        base_traits: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            base_traits: base_traits.into(),
            ..Default::default()
        }
    }

    // --- Builder-style setters ---

    /// Add or replace the text for one category.
    pub fn category_prompt(mut self, category: impl Into<String>, text: impl Into<String>) -> Self {
        self.category_prompts.insert(category.into(), text.into());
        self
    }

    /// Set the problem-solving framework.
    pub fn framework(mut self, framework: ProblemSolvingFramework) -> Self {
        self.problem_solving_framework = Some(framework);
        self
    }

    /// Set the problem-solving style.
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.problem_solving_style = Some(style.into());
        self
    }

    /// Set the strengths.
    pub fn strengths(mut self, strengths: Vec<ProblemType>) -> Self {
        self.strengths = strengths;
        self
    }

    /// Set the decision-making process.
    pub fn decision_process(mut self, process: impl Into<String>) -> Self {
        self.decision_making_process = Some(process.into());
        self
    }

    /// Set the signature techniques.
    pub fn techniques(mut self, techniques: Vec<String>) -> Self {
        self.signature_techniques = techniques;
        self
    }

    /// Whether this persona has dedicated text for `category_key`.
    pub fn covers_category(&self, category_key: &str) -> bool {
        self.category_prompts.contains_key(category_key)
    }

    /// Strength labels joined for display, e.g. in the persona menu.
    pub fn strengths_label(&self) -> String {
        self.strengths
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Framework name, if a framework is defined.
    pub fn framework_name(&self) -> Option<&str> {
        self.problem_solving_framework
            .as_ref()
            .map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_type_labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            ProblemType::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels.len(), ProblemType::ALL.len());
    }

    #[test]
    fn test_problem_type_serde() {
        assert_eq!(
            serde_yaml::from_str::<ProblemType>("financial").unwrap(),
            ProblemType::Financial
        );
        assert!(serde_yaml::from_str::<ProblemType>("mystical").is_err());
    }

    #[test]
    fn test_record_builder() {
        let rec = PersonaRecord::new("edison", "Thomas Edison", "You are Edison.")
            .category_prompt("business", "Think about markets.")
            .strengths(vec![ProblemType::Technical, ProblemType::Creative])
            .style("Iterate quickly.");

        assert!(rec.covers_category("business"));
        assert!(!rec.covers_category("politics"));
        assert_eq!(rec.strengths_label(), "Technical problems, Creative challenges");
        assert_eq!(rec.problem_solving_style.as_deref(), Some("Iterate quickly."));
        assert!(rec.framework_name().is_none());
    }

    #[test]
    fn test_record_yaml_minimal() {
        let yaml = r#"
key: alpha
display_name: Alpha
base_traits: You are Alpha.
"#;
        let rec: PersonaRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rec.key, "alpha");
        assert!(rec.category_prompts.is_empty());
        assert!(rec.problem_solving_framework.is_none());
        assert!(rec.strengths.is_empty());
    }
}
