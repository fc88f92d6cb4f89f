//! Structured problem solving with personas.
//!
//! - [`session`] - one persona runs a four-stage pipeline
//!   (analyze → generate → evaluate → plan)
//! - [`battle`] - several personas answer the same problem and a judge ranks them
//!
//! Stage replies are requested as JSON but models do not always comply, so
//! everything here parses leniently and falls back to the raw reply text.

pub mod battle;
pub mod session;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use battle::{BattleResult, ProblemSolvingBattle};
pub use session::{ProblemSolvingSession, Stage};

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// One candidate solution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Solution {
    pub summary: String,
    pub detailed_steps: Vec<String>,
    pub expected_outcomes: Vec<String>,
    pub risks: Vec<String>,
    pub success_metrics: Vec<String>,
    pub timeline: String,
    pub resources_needed: Vec<String>,
}

impl Solution {
    /// A solution carrying only free text, used when a reply has no structure.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            summary: text.into(),
            ..Default::default()
        }
    }
}

/// Output of the analysis stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemAnalysis {
    pub original_problem: String,
    pub essence: String,
    pub root_cause: String,
    pub stakeholders: Vec<String>,
    pub constraints: Vec<String>,
    pub desired_outcome: String,
    /// The analyzer's reply, verbatim.
    pub raw: String,
}

/// Evaluator's choice among the candidate solutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionEvaluation {
    /// Zero-based index into the candidates.
    pub selected: usize,
    /// The evaluator's reply, verbatim.
    pub rationale: String,
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSolvingResult {
    pub problem: String,
    pub analysis: ProblemAnalysis,
    pub candidates: Vec<Solution>,
    pub evaluation: SolutionEvaluation,
    pub solution: Solution,
    pub action_plan: String,
    pub solved_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Lenient reply parsing
// ---------------------------------------------------------------------------

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n(.*?)```").expect("valid fenced-block regex")
});

static SELECTED_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""?selected"?\s*:\s*(\d+)"#).expect("valid selection regex"));

/// Every JSON object or array in `text`, in the order they should be tried.
///
/// Values inside fenced code blocks come first, then values found anywhere in
/// the text. Each `{` or `[` is tried as a starting point and trailing prose
/// after a value is ignored.
pub fn json_candidates(text: &str) -> impl Iterator<Item = Value> + '_ {
    FENCED_BLOCK
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .flat_map(|m| inline_values(m.as_str()))
        .chain(inline_values(text))
}

fn inline_values(text: &str) -> impl Iterator<Item = Value> + '_ {
    text.char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .filter_map(move |(i, _)| {
            serde_json::Deserializer::from_str(&text[i..])
                .into_iter::<Value>()
                .next()
                .and_then(|r| r.ok())
                .filter(|v| v.is_object() || v.is_array())
        })
}

/// The first JSON object or array in `text`, whatever its shape.
pub fn extract_json(text: &str) -> Option<Value> {
    json_candidates(text).next()
}

/// The first candidate that deserializes into `T` and passes `accept`.
///
/// Values of the wrong shape, such as a bracketed `[1]` in prose, are skipped.
pub fn extract_as<T, F>(text: &str, accept: F) -> Option<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    json_candidates(text)
        .find_map(|value| serde_json::from_value::<T>(value).ok().filter(&accept))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnalysisReply {
    essence: String,
    root_cause: String,
    stakeholders: Vec<String>,
    constraints: Vec<String>,
    desired_outcome: String,
}

/// Build a [`ProblemAnalysis`] from an analyzer reply.
///
/// When no usable JSON is found the whole reply becomes the essence.
pub fn parse_analysis(problem: &str, reply: &str) -> ProblemAnalysis {
    let parsed = extract_as::<AnalysisReply, _>(reply, |a| !a.essence.trim().is_empty());

    match parsed {
        Some(a) => ProblemAnalysis {
            original_problem: problem.to_string(),
            essence: a.essence,
            root_cause: a.root_cause,
            stakeholders: a.stakeholders,
            constraints: a.constraints,
            desired_outcome: a.desired_outcome,
            raw: reply.to_string(),
        },
        None => {
            log::debug!("Analyzer reply had no usable JSON; using raw text");
            ProblemAnalysis {
                original_problem: problem.to_string(),
                essence: reply.trim().to_string(),
                raw: reply.to_string(),
                ..Default::default()
            }
        }
    }
}

/// Build the candidate list from a generator reply.
///
/// Accepts a JSON array of solutions, an object with a `solutions` array, or
/// a single solution object. Never returns an empty list.
pub fn parse_solutions(reply: &str) -> Vec<Solution> {
    match json_candidates(reply).find_map(solutions_from_value) {
        Some(solutions) => solutions,
        None => {
            log::debug!("Generator reply had no usable JSON; using raw text");
            vec![Solution::from_text(reply.trim())]
        }
    }
}

/// Solutions in one JSON value; `None` unless at least one has a summary.
fn solutions_from_value(value: Value) -> Option<Vec<Solution>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("solutions") {
            Some(Value::Array(items)) => items,
            Some(_) => return None,
            None => vec![Value::Object(map)],
        },
        _ => return None,
    };

    let solutions: Vec<Solution> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value::<Solution>(item).ok())
        .filter(|s| !s.summary.trim().is_empty())
        .collect();
    (!solutions.is_empty()).then_some(solutions)
}

/// Zero-based index chosen by an evaluator reply, defaulting to the first.
pub fn parse_selection(reply: &str, candidates: usize) -> usize {
    SELECTED_INDEX
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|n| (1..=candidates).contains(n))
        .map_or(0, |n| n - 1)
}

/// First `limit` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_block() {
        let reply = "Here you go:\n```json\n{\"essence\": \"cost\"}\n```\nGood luck.";
        assert_eq!(extract_json(reply).unwrap()["essence"], "cost");
    }

    #[test]
    fn test_extract_json_from_prose() {
        let reply = "Let me think {not json} ... {\"a\": [1, 2]} and more text";
        assert_eq!(extract_json(reply).unwrap()["a"][1], 2);
        assert!(extract_json("no structure here").is_none());
    }

    #[test]
    fn test_parse_analysis() {
        let reply = r#"{"essence": "Too slow", "root_cause": "Manual steps",
            "stakeholders": ["team"], "constraints": ["budget"], "desired_outcome": "Ship weekly"}"#;
        let analysis = parse_analysis("We ship slowly", reply);
        assert_eq!(analysis.original_problem, "We ship slowly");
        assert_eq!(analysis.essence, "Too slow");
        assert_eq!(analysis.constraints, vec!["budget"]);
        assert_eq!(analysis.raw, reply);
    }

    #[test]
    fn test_citation_before_analysis_json() {
        let reply = r#"Per point [1] above, my analysis: {"essence": "Too slow", "root_cause": "Manual steps"}"#;
        let analysis = parse_analysis("p", reply);
        assert_eq!(analysis.essence, "Too slow");
        assert_eq!(analysis.root_cause, "Manual steps");
    }

    #[test]
    fn test_citation_before_solutions_json() {
        let parsed = parse_solutions(r#"See [2]. [{"summary": "Cut projects"}, {"summary": "Hire"}]"#);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].summary, "Cut projects");
        assert_eq!(parsed[1].summary, "Hire");

        let wrapped = r#"Notes {"draft": true} then {"solutions": [{"summary": "Pilot"}]}"#;
        assert_eq!(parse_solutions(wrapped), vec![Solution::from_text("Pilot")]);
    }

    #[test]
    fn test_extract_as_skips_wrong_shapes() {
        let reply = "[1] ```json\n{\"selected\": 2}\n``` {\"essence\": \"x\"}";
        assert_eq!(extract_json(reply).unwrap()["selected"], 2);
        let essence: Option<AnalysisReply> = extract_as(reply, |a: &AnalysisReply| !a.essence.is_empty());
        assert_eq!(essence.unwrap().essence, "x");
    }

    #[test]
    fn test_parse_analysis_fallback() {
        let analysis = parse_analysis("p", "  The essence is courage.  ");
        assert_eq!(analysis.essence, "The essence is courage.");
        assert!(analysis.stakeholders.is_empty());
    }

    #[test]
    fn test_parse_solutions_shapes() {
        let array = r#"[{"summary": "A", "timeline": "1 month"}, {"summary": "B"}]"#;
        let parsed = parse_solutions(array);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].timeline, "1 month");

        let wrapped = r#"{"solutions": [{"summary": "C", "risks": ["r"]}]}"#;
        assert_eq!(parse_solutions(wrapped)[0].risks, vec!["r"]);

        let single = r#"{"summary": "D", "detailed_steps": ["x", "y"]}"#;
        assert_eq!(parse_solutions(single)[0].detailed_steps, vec!["x", "y"]);
    }

    #[test]
    fn test_parse_solutions_fallback() {
        let parsed = parse_solutions("Build a lab and try everything.");
        assert_eq!(parsed, vec![Solution::from_text("Build a lab and try everything.")]);
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection(r#"I choose {"selected": 2}"#, 3), 1);
        assert_eq!(parse_selection("selected: 3", 3), 2);
        assert_eq!(parse_selection(r#"{"selected": 7}"#, 3), 0);
        assert_eq!(parse_selection("The first one.", 3), 0);
    }

    #[test]
    fn test_preview_counts_characters() {
        assert_eq!(preview("short", 200), "short");
        let long = "é".repeat(201);
        let cut = preview(&long, 200);
        assert_eq!(cut.chars().count(), 203);
        assert!(cut.ends_with("..."));
    }
}
