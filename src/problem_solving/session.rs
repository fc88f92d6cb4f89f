//! Four-stage problem-solving pipeline for a single persona.
//!
//! Each stage is one `respond` call on a purpose-built agent whose system
//! prompt is the persona's problem-solving prompt followed by the stage's
//! instructions. Stages run strictly one after another.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::agent::{names, AgentFactory};
use crate::error::{LlmError, PersonaError};
use crate::persona::prompt::SEPARATOR;
use crate::persona::{PersonaCatalog, PersonaRecord};
use crate::problem_solving::{
    parse_analysis, parse_selection, parse_solutions, ProblemAnalysis, ProblemSolvingResult,
    Solution, SolutionEvaluation,
};

/// Pipeline stage, reported to the caller as each one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyze,
    Generate,
    Evaluate,
    Plan,
}

impl Stage {
    /// One-based position in the pipeline.
    pub fn number(&self) -> usize {
        match self {
            Self::Analyze => 1,
            Self::Generate => 2,
            Self::Evaluate => 3,
            Self::Plan => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Analyze => "Problem analysis",
            Self::Generate => "Generating solutions",
            Self::Evaluate => "Evaluating solutions",
            Self::Plan => "Action plan",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.number(), self.label())
    }
}

/// Runs the pipeline for one persona and remembers past runs.
pub struct ProblemSolvingSession {
    persona: Arc<PersonaRecord>,
    persona_prompt: String,
    factory: Arc<dyn AgentFactory>,
    history: Vec<ProblemSolvingResult>,
}

impl fmt::Debug for ProblemSolvingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemSolvingSession")
            .field("persona", &self.persona.key)
            .field("history", &self.history.len())
            .finish()
    }
}

impl ProblemSolvingSession {
    pub fn new(
        catalog: &PersonaCatalog,
        persona_key: &str,
        factory: Arc<dyn AgentFactory>,
    ) -> Result<Self, PersonaError> {
        Ok(Self {
            persona: catalog.persona(persona_key)?,
            persona_prompt: catalog.compose_problem_solving_prompt(persona_key)?,
            factory,
            history: Vec::new(),
        })
    }

    pub fn persona(&self) -> &PersonaRecord {
        &self.persona
    }

    /// Completed runs, oldest first.
    pub fn history(&self) -> &[ProblemSolvingResult] {
        &self.history
    }

    fn framework_name(&self) -> &str {
        self.persona.framework_name().unwrap_or("your own method")
    }

    async fn ask(&self, agent_name: &str, instructions: &str, task: &str) -> Result<String, LlmError> {
        let system_prompt = format!("{}{}{}", self.persona_prompt, SEPARATOR, instructions);
        let agent = self.factory.create_agent(agent_name, &system_prompt);
        agent.respond(task).await
    }

    // --- Stages ---

    /// Stage 1: structure the problem.
    pub async fn analyze_problem(&self, problem: &str) -> Result<ProblemAnalysis, LlmError> {
        let instructions = format!(
            "You are {name}. Analyze the problem you are given from these angles:\n\
             1. What is the essence of the problem?\n\
             2. Surface symptoms versus root cause\n\
             3. Stakeholders and their interests\n\
             4. Constraints\n\
             5. The desired outcome\n\n\
             Analyze it from {name}'s point of view and answer with a JSON object \
             with the keys \"essence\", \"root_cause\", \"stakeholders\" (array), \
             \"constraints\" (array) and \"desired_outcome\".",
            name = self.persona.display_name
        );
        let reply = self
            .ask(
                names::PROBLEM_ANALYZER,
                &instructions,
                &format!("Analyze the following problem: {}", problem),
            )
            .await?;
        Ok(parse_analysis(problem, &reply))
    }

    /// Stage 2: propose candidate solutions.
    pub async fn generate_solutions(
        &self,
        analysis: &ProblemAnalysis,
    ) -> Result<Vec<Solution>, LlmError> {
        let instructions = format!(
            "You are {name}. Use {framework} to generate up to three solutions to the \
             problem. Every solution must include a summary, detailed steps, expected \
             outcomes, risks, success metrics, a timeline and the resources needed.\n\n\
             Answer with a JSON array of objects with the keys \"summary\", \
             \"detailed_steps\", \"expected_outcomes\", \"risks\", \"success_metrics\", \
             \"timeline\" and \"resources_needed\". Make the solutions unmistakably {name}'s.",
            name = self.persona.display_name,
            framework = self.framework_name()
        );
        let task = format!(
            "Problem: {}\nEssence: {}\nRoot cause: {}\nConstraints: {}\nDesired outcome: {}",
            analysis.original_problem,
            analysis.essence,
            analysis.root_cause,
            analysis.constraints.join(", "),
            analysis.desired_outcome
        );
        let reply = self.ask(names::SOLUTION_GENERATOR, &instructions, &task).await?;
        Ok(parse_solutions(&reply))
    }

    /// Stage 3: pick one candidate.
    pub async fn evaluate_solutions(
        &self,
        solutions: &[Solution],
    ) -> Result<SolutionEvaluation, LlmError> {
        let criteria = self
            .persona
            .problem_solving_framework
            .as_ref()
            .map(|f| f.evaluation_criteria.as_slice())
            .unwrap_or(&[]);
        let criteria_block = if criteria.is_empty() {
            "- Your own judgment".to_string()
        } else {
            criteria
                .iter()
                .map(|c| format!("- {}", c))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let instructions = format!(
            "You are {name}. Evaluate the solutions you are given against these criteria:\n\n\
             {criteria}\n\n\
             Choose the most appropriate solution according to {name}'s values and \
             explain why. End your answer with {{\"selected\": N}}, where N is the \
             number of the chosen solution.",
            name = self.persona.display_name,
            criteria = criteria_block
        );
        let listing = solutions
            .iter()
            .enumerate()
            .map(|(i, s)| format!("Solution {}: {}", i + 1, s.summary))
            .collect::<Vec<_>>()
            .join("\n\n");
        let reply = self
            .ask(
                names::SOLUTION_EVALUATOR,
                &instructions,
                &format!("Evaluate the following solutions:\n{}", listing),
            )
            .await?;
        Ok(SolutionEvaluation {
            selected: parse_selection(&reply, solutions.len()),
            rationale: reply,
        })
    }

    /// Stage 4: turn the chosen solution into a plan.
    pub async fn create_action_plan(&self, solution: &Solution) -> Result<String, LlmError> {
        let instructions = format!(
            "You are {name}. Write a detailed action plan for carrying out the chosen \
             solution. Include:\n\
             1. What to do immediately (within 24 hours)\n\
             2. Short-term actions (within a week)\n\
             3. Mid-term actions (within a month)\n\
             4. Long-term actions (within three months)\n\
             5. How success will be judged\n\
             6. Regular review points\n\n\
             Reflect {name}'s way of getting things done.",
            name = self.persona.display_name
        );
        let task = format!(
            "Solution: {}\nSteps: {}\nResources needed: {}\nTimeline: {}",
            solution.summary,
            solution.detailed_steps.join(", "),
            solution.resources_needed.join(", "),
            solution.timeline
        );
        self.ask(names::ACTION_PLANNER, &instructions, &task).await
    }

    /// Run all four stages and record the result in the history.
    ///
    /// `on_stage` is called as each stage starts.
    pub async fn solve_problem<F>(
        &mut self,
        problem: &str,
        mut on_stage: F,
    ) -> Result<ProblemSolvingResult, LlmError>
    where
        F: FnMut(Stage),
    {
        log::info!("{} is solving: {}", self.persona.key, problem);

        on_stage(Stage::Analyze);
        let analysis = self.analyze_problem(problem).await?;

        on_stage(Stage::Generate);
        let candidates = self.generate_solutions(&analysis).await?;

        on_stage(Stage::Evaluate);
        let evaluation = self.evaluate_solutions(&candidates).await?;
        let solution = candidates
            .get(evaluation.selected)
            .cloned()
            .unwrap_or_default();

        on_stage(Stage::Plan);
        let action_plan = self.create_action_plan(&solution).await?;

        let result = ProblemSolvingResult {
            problem: problem.to_string(),
            analysis,
            candidates,
            evaluation,
            solution,
            action_plan,
            solved_at: Utc::now(),
        };
        self.history.push(result.clone());
        Ok(result)
    }
}
