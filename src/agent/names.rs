//! Agent naming.
//!
//! Names attribute messages to speakers in multi-agent flows, so they must be
//! deterministic for a given persona and category.

/// Name of the pipeline stage that analyzes the problem.
pub const PROBLEM_ANALYZER: &str = "problem_analyzer";
/// Name of the pipeline stage that proposes solutions.
pub const SOLUTION_GENERATOR: &str = "solution_generator";
/// Name of the pipeline stage that picks a solution.
pub const SOLUTION_EVALUATOR: &str = "solution_evaluator";
/// Name of the pipeline stage that writes the action plan.
pub const ACTION_PLANNER: &str = "action_planner";
/// Name of the battle judge.
pub const JUDGE: &str = "judge";

/// `{persona}_{category}`
pub fn category_agent(persona_key: &str, category_key: &str) -> String {
    format!("{}_{}", persona_key, category_key)
}

/// `{persona}_problem_solver`
pub fn problem_solver(persona_key: &str) -> String {
    format!("{}_problem_solver", persona_key)
}

/// `{persona}_{category}_specialist`
pub fn specialist(persona_key: &str, category_key: &str) -> String {
    format!("{}_{}_specialist", persona_key, category_key)
}

/// `{persona}_battler`
pub fn battler(persona_key: &str) -> String {
    format!("{}_battler", persona_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_templates() {
        assert_eq!(category_agent("edison", "future"), "edison_future");
        assert_eq!(problem_solver("edison"), "edison_problem_solver");
        assert_eq!(specialist("edison", "future"), "edison_future_specialist");
        assert_eq!(battler("edison"), "edison_battler");
    }

    #[test]
    fn test_modes_never_collide() {
        for (p, c) in [("edison", "future"), ("a", "b"), ("black_jack", "medical")] {
            let names: HashSet<_> = [
                category_agent(p, c),
                problem_solver(p),
                specialist(p, c),
                battler(p),
            ]
            .into_iter()
            .collect();
            assert_eq!(names.len(), 4, "{p}/{c}");

            let base = category_agent(p, c);
            assert_eq!(specialist(p, c).strip_prefix(&base), Some("_specialist"));
            assert_eq!(problem_solver(p).strip_prefix(p), Some("_problem_solver"));
            assert_eq!(battler(p).strip_prefix(p), Some("_battler"));
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(category_agent("x", "y"), category_agent("x", "y"));
    }
}
