//! Problem-solving battle: several personas answer, one judge decides.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::{names, AgentFactory};
use crate::error::{LlmError, PersonaError};
use crate::persona::{PersonaCatalog, PersonaRecord};

/// System prompt of the impartial judge.
pub const JUDGE_PROMPT: &str = "You are an impartial judge. Evaluate each great mind's \
solution on the following points:\n\n\
1. Originality\n\
2. Feasibility\n\
3. Size of the impact\n\
4. Low risk\n\
5. Sustainability\n\n\
Choose the best solution and explain why. Also point out the strengths and \
weaknesses of every solution.";

/// One entrant's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEntry {
    pub display_name: String,
    pub solution: String,
}

/// Outcome of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub problem: String,
    /// Entries in entrant order.
    pub solutions: Vec<BattleEntry>,
    pub judgment: String,
}

/// Runs one solution call per entrant, then one judge call.
pub struct ProblemSolvingBattle {
    entrants: Vec<(Arc<PersonaRecord>, String)>,
    factory: Arc<dyn AgentFactory>,
}

impl ProblemSolvingBattle {
    /// Prepare a battle between `persona_keys`, in that order.
    pub fn new(
        catalog: &PersonaCatalog,
        persona_keys: &[String],
        factory: Arc<dyn AgentFactory>,
    ) -> Result<Self, PersonaError> {
        let entrants = persona_keys
            .iter()
            .map(|key| Ok((catalog.persona(key)?, catalog.compose_battle_prompt(key)?)))
            .collect::<Result<Vec<_>, PersonaError>>()?;
        Ok(Self { entrants, factory })
    }

    pub fn entrants(&self) -> impl Iterator<Item = &PersonaRecord> {
        self.entrants.iter().map(|(p, _)| p.as_ref())
    }

    /// Run the battle. `on_solution` sees each entry as soon as it arrives.
    ///
    /// Calls are sequential; the first failure aborts the battle.
    pub async fn battle<F>(&self, problem: &str, mut on_solution: F) -> Result<BattleResult, LlmError>
    where
        F: FnMut(&BattleEntry),
    {
        let mut solutions = Vec::with_capacity(self.entrants.len());
        for (persona, prompt) in &self.entrants {
            let agent = self
                .factory
                .create_agent(&names::battler(&persona.key), prompt);
            let entry = BattleEntry {
                display_name: persona.display_name.clone(),
                solution: agent.respond(problem).await?,
            };
            on_solution(&entry);
            solutions.push(entry);
        }

        let listing = solutions
            .iter()
            .map(|e| format!("{}:\n{}", e.display_name, e.solution))
            .collect::<Vec<_>>()
            .join("\n\n");
        let judge = self.factory.create_agent(names::JUDGE, JUDGE_PROMPT);
        let judgment = judge
            .respond(&format!("Evaluate the following solutions:\n\n{}", listing))
            .await?;

        Ok(BattleResult {
            problem: problem.to_string(),
            solutions,
            judgment,
        })
    }
}
