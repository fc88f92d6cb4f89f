//! Prompt composition.
//!
//! Every composed prompt starts with the persona's `base_traits` verbatim,
//! followed by [`SEPARATOR`] and a mode-specific block. Sections are headed by
//! a bracketed title on its own line; list items are rendered one per line as
//! `- item` or, for framework steps, `N. step`. Optional fields that are absent
//! (or empty lists) produce no section at all.

use crate::persona::record::PersonaRecord;

/// Separator placed between the base traits and the rest of the prompt.
pub const SEPARATOR: &str = "\n\n";

pub const SECTION_MISSION: &str = "[Problem-solving mission]";
pub const SECTION_STYLE: &str = "[Problem-solving style]";
pub const SECTION_FRAMEWORK_PREFIX: &str = "[Framework: ";
pub const SECTION_KEY_QUESTIONS: &str = "[Key questions]";
pub const SECTION_EVALUATION: &str = "[Evaluation criteria]";
pub const SECTION_TOOLS: &str = "[Tools]";
pub const SECTION_DECISION: &str = "[Decision-making process]";
pub const SECTION_TECHNIQUES: &str = "[Signature techniques]";
pub const SECTION_STRENGTHS: &str = "[Strengths]";
pub const SECTION_GUIDELINES: &str = "[Guidelines]";

/// Separator used when joining strength labels.
pub const STRENGTHS_SEPARATOR: &str = ", ";

/// Fallback category text when a persona has nothing specific to say.
pub fn category_fallback(display_label: &str) -> String {
    format!("Answer professionally about {}.", display_label)
}

/// Fallback text for specialist agents.
pub fn specialist_fallback(display_label: &str) -> String {
    format!("Solve {} problems professionally.", display_label)
}

/// `base_traits + "\n\n" + (category text | fallback)`.
pub fn render_category_prompt(
    persona: &PersonaRecord,
    category_key: &str,
    category_label: &str,
) -> String {
    let body = persona
        .category_prompts
        .get(category_key)
        .cloned()
        .unwrap_or_else(|| category_fallback(category_label));
    format!("{}{}{}", persona.base_traits, SEPARATOR, body)
}

/// Render the full problem-solving prompt for a persona.
pub fn render_problem_solving_prompt(persona: &PersonaRecord) -> String {
    let name = &persona.display_name;
    let mut blocks: Vec<String> = Vec::new();

    blocks.push(format!(
        "{}\nAs {}, you solve any problem with your own distinctive methods.",
        SECTION_MISSION, name
    ));

    if let Some(style) = non_empty(persona.problem_solving_style.as_deref()) {
        blocks.push(format!("{}\n{}", SECTION_STYLE, style));
    }

    if let Some(framework) = &persona.problem_solving_framework {
        let mut block = format!("{}{}]", SECTION_FRAMEWORK_PREFIX, framework.name);
        if !framework.steps.is_empty() {
            block.push_str("\nSteps:\n");
            block.push_str(&numbered(&framework.steps));
        }
        blocks.push(block);

        push_list(&mut blocks, SECTION_KEY_QUESTIONS, &framework.key_questions);
        push_list(&mut blocks, SECTION_EVALUATION, &framework.evaluation_criteria);
        push_list(&mut blocks, SECTION_TOOLS, &framework.tools);
    }

    if let Some(process) = non_empty(persona.decision_making_process.as_deref()) {
        blocks.push(format!("{}\n{}", SECTION_DECISION, process));
    }

    push_list(&mut blocks, SECTION_TECHNIQUES, &persona.signature_techniques);

    if !persona.strengths.is_empty() {
        let labels: Vec<&str> = persona.strengths.iter().map(|s| s.label()).collect();
        blocks.push(format!(
            "{}\n{}",
            SECTION_STRENGTHS,
            labels.join(STRENGTHS_SEPARATOR)
        ));
    }

    blocks.push(format!(
        "{}\n\
         1. Understand the problem deeply and find its essence.\n\
         2. Analyze it from {}'s own perspective and with {}'s own methods.\n\
         3. Offer concrete, actionable solutions.\n\
         4. Cover the risks and how to counter them.\n\
         5. Encourage the person asking and move them to act.",
        SECTION_GUIDELINES, name, name
    ));

    blocks.push(format!(
        "Always answer fully in the personality, voice and thinking patterns of {}.",
        name
    ));

    format!("{}{}{}", persona.base_traits, SEPARATOR, blocks.join("\n\n"))
}

/// Render a category specialist prompt.
pub fn render_specialist_prompt(
    persona: &PersonaRecord,
    category_key: &str,
    category_label: &str,
) -> String {
    let name = &persona.display_name;
    let mut blocks: Vec<String> = Vec::new();

    let body = persona
        .category_prompts
        .get(category_key)
        .cloned()
        .unwrap_or_else(|| specialist_fallback(category_label));
    blocks.push(format!("[{} specialist]\n{}", category_label, body.trim()));

    if let Some(style) = non_empty(persona.problem_solving_style.as_deref()) {
        blocks.push(style.to_string());
    }

    if let Some(framework) = persona.framework_name() {
        blocks.push(format!(
            "[Approach]\nFor problems in this field, apply {} and derive solutions from {}'s own point of view.",
            framework, name
        ));
    }

    if let Some(process) = non_empty(persona.decision_making_process.as_deref()) {
        blocks.push(format!("[Decision criteria]\n{}", process));
    }

    blocks.push(format!(
        "Always solve the problem as {}, in that person's own way.",
        name
    ));

    format!("{}{}{}", persona.base_traits, SEPARATOR, blocks.join("\n\n"))
}

/// Render the prompt used by a persona competing in a battle.
pub fn render_battle_prompt(persona: &PersonaRecord) -> String {
    let mut blocks: Vec<String> = Vec::new();

    blocks.push(match persona.framework_name() {
        Some(framework) => format!(
            "Apply {} to the problem you are given and present your best solution.",
            framework
        ),
        None => "Present your best solution to the problem you are given.".to_string(),
    });
    blocks.push(
        "Other great minds are working on the same problem. Show what makes your \
         approach unique and superior, and explain why your solution is the best."
            .to_string(),
    );
    if let Some(style) = non_empty(persona.problem_solving_style.as_deref()) {
        blocks.push(style.to_string());
    }

    format!("{}{}{}", persona.base_traits, SEPARATOR, blocks.join("\n\n"))
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_list(blocks: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let lines = items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n");
    blocks.push(format!("{}\n{}", title, lines));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::record::{ProblemSolvingFramework, ProblemType};

    fn full_persona() -> PersonaRecord {
        PersonaRecord::new("von_neumann", "John von Neumann", "You are John von Neumann.\n")
            .category_prompt("business", "Everything is an optimization problem.")
            .framework(ProblemSolvingFramework {
                name: "Mathematical optimization".into(),
                steps: vec![
                    "Formulate the problem - variables, constraints, objective".into(),
                    "Explore the whole solution space".into(),
                    "Check sensitivity".into(),
                ],
                key_questions: vec![
                    "What are the essential variables?".into(),
                    "What should be maximized?".into(),
                ],
                evaluation_criteria: vec!["Rigor".into(), "Optimality".into()],
                tools: vec!["Linear programming".into(), "Game theory".into()],
            })
            .style("Sees several models at once.\n")
            .strengths(vec![ProblemType::Analytical, ProblemType::Strategic])
            .decision_process("1. Compute expected values\n2. Apply minimax\n")
            .techniques(vec!["Monte Carlo simulation".into()])
    }

    /// Split a rendered prompt into (section title, item lines).
    fn parse_sections(prompt: &str) -> Vec<(String, Vec<String>)> {
        let mut sections: Vec<(String, Vec<String>)> = Vec::new();
        for line in prompt.lines() {
            if line.starts_with('[') && line.ends_with(']') {
                sections.push((line.to_string(), Vec::new()));
            } else if let Some((_, items)) = sections.last_mut() {
                if let Some(item) = line.strip_prefix("- ") {
                    items.push(item.to_string());
                } else if let Some((num, rest)) = line.split_once(". ") {
                    if num.chars().all(|c| c.is_ascii_digit()) && !num.is_empty() {
                        items.push(rest.to_string());
                    }
                }
            }
        }
        sections
    }

    fn items<'a>(sections: &'a [(String, Vec<String>)], title: &str) -> &'a [String] {
        sections
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, i)| i.as_slice())
            .unwrap_or(&[])
    }

    #[test]
    fn test_category_prompt_uses_specific_text() {
        let p = full_persona();
        let prompt = render_category_prompt(&p, "business", "Business");
        assert_eq!(
            prompt,
            "You are John von Neumann.\n\n\nEverything is an optimization problem."
        );
    }

    #[test]
    fn test_category_prompt_fallback() {
        let p = full_persona();
        let prompt = render_category_prompt(&p, "politics", "Politics");
        assert!(prompt.starts_with(&format!("{}{}", p.base_traits, SEPARATOR)));
        assert!(prompt.ends_with("Answer professionally about Politics."));
    }

    #[test]
    fn test_problem_solving_round_trip() {
        let p = full_persona();
        let prompt = render_problem_solving_prompt(&p);
        assert!(prompt.starts_with(&format!("{}{}", p.base_traits, SEPARATOR)));

        let sections = parse_sections(&prompt);
        let framework = p.problem_solving_framework.as_ref().unwrap();

        assert_eq!(
            items(&sections, "[Framework: Mathematical optimization]"),
            framework.steps.as_slice()
        );
        assert_eq!(items(&sections, SECTION_KEY_QUESTIONS), framework.key_questions.as_slice());
        assert_eq!(
            items(&sections, SECTION_EVALUATION),
            framework.evaluation_criteria.as_slice()
        );
        assert_eq!(items(&sections, SECTION_TOOLS), framework.tools.as_slice());
        assert_eq!(
            items(&sections, SECTION_TECHNIQUES),
            p.signature_techniques.as_slice()
        );
        assert!(prompt.contains("[Strengths]\nAnalytical challenges, Strategic problems"));
        assert!(prompt.contains("[Decision-making process]\n1. Compute expected values\n2. Apply minimax"));
    }

    #[test]
    fn test_problem_solving_omits_absent_fields() {
        let p = PersonaRecord::new("plain", "Plain Person", "You are plain.");
        let prompt = render_problem_solving_prompt(&p);

        for title in [
            SECTION_STYLE,
            SECTION_KEY_QUESTIONS,
            SECTION_EVALUATION,
            SECTION_TOOLS,
            SECTION_DECISION,
            SECTION_TECHNIQUES,
            SECTION_STRENGTHS,
        ] {
            assert!(!prompt.contains(title), "unexpected section {}", title);
        }
        assert!(!prompt.contains(SECTION_FRAMEWORK_PREFIX));
        assert!(prompt.contains(SECTION_MISSION));
        assert!(!prompt.contains("None"));
    }

    #[test]
    fn test_problem_solving_is_deterministic() {
        let p = full_persona();
        assert_eq!(
            render_problem_solving_prompt(&p),
            render_problem_solving_prompt(&p)
        );
    }

    #[test]
    fn test_specialist_prompt() {
        let p = full_persona();
        let prompt = render_specialist_prompt(&p, "business", "Business");
        assert!(prompt.starts_with("You are John von Neumann.\n\n\n[Business specialist]"));
        assert!(prompt.contains("apply Mathematical optimization"));

        let fallback = render_specialist_prompt(&p, "medical", "Medicine");
        assert!(fallback.contains("Solve Medicine problems professionally."));
    }

    #[test]
    fn test_battle_prompt_without_framework() {
        let p = PersonaRecord::new("plain", "Plain Person", "You are plain.");
        let prompt = render_battle_prompt(&p);
        assert!(prompt.starts_with("You are plain.\n\n"));
        assert!(prompt.contains("Present your best solution"));
    }
}
