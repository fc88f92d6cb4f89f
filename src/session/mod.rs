//! Interactive console session.
//!
//! ```text
//! MainMenu ─┬─ SinglePersonaChat ──────┐
//!           ├─ ScenarioChat ───────────┤
//!           ├─ MultiPersonaDiscussion ─┤
//!           ├─ ProblemSolvingSession ──┼─→ MainMenu
//!           ├─ ProblemSolvingBattle ───┤
//!           ├─ SpecializedConsultation ┘
//!           └─ Exit (menu item or end of input)
//! ```
//!
//! Menu mistakes are handled at the prompt that read them. Any other failure
//! inside a flow ends that flow; the main loop prints it and shows the menu
//! again. Only console I/O failures end the session.

pub mod menu;

use std::io::{self, Write};
use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::agent::{names, AgentFactory, ChatAgent};
use crate::error::SessionError;
use crate::persona::{PersonaCatalog, Scenarios};
use crate::problem_solving::{preview, ProblemSolvingBattle, ProblemSolvingSession};
use crate::team::{RoundRobinTeam, TurnCoordinator};
use crate::utilities::printer::{Printer, PrinterColor};

use self::menu::{is_exit_keyword, parse_choice, InvalidMenuInput, MainMenuItem};

/// Turns per multi-persona discussion.
pub const DEFAULT_DISCUSSION_TURNS: usize = 6;
/// Personas taking part in a discussion or battle.
pub const PANEL_SIZE: usize = 3;
/// Characters of each battle solution shown before the judgment.
pub const BATTLE_PREVIEW_CHARS: usize = 200;

const CHAT_EXIT_KEYWORDS: &[&str] = &["exit", "quit"];
const CONSULTATION_EXIT_KEYWORDS: &[&str] = &["exit"];

/// Where control goes when a flow ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Menu,
    /// Input is exhausted.
    Exit,
}

type FlowResult = Result<Flow, SessionError>;

/// Menu-driven front end over a catalog and an agent factory.
pub struct ConsoleSession<R, W: Write> {
    catalog: Arc<PersonaCatalog>,
    scenarios: Scenarios,
    factory: Arc<dyn AgentFactory>,
    input: Lines<R>,
    printer: Printer<W>,
    discussion_turns: usize,
}

impl<R, W> ConsoleSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(
        catalog: Arc<PersonaCatalog>,
        scenarios: Scenarios,
        factory: Arc<dyn AgentFactory>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            catalog,
            scenarios,
            factory,
            input: input.lines(),
            printer: Printer::new(output, false),
            discussion_turns: DEFAULT_DISCUSSION_TURNS,
        }
    }

    // --- Builder-style setters ---

    /// Enable or disable ANSI colors.
    pub fn color(mut self, color: bool) -> Self {
        self.printer.set_color(color);
        self
    }

    /// Set the turn budget for discussions.
    pub fn discussion_turns(mut self, turns: usize) -> Self {
        self.discussion_turns = turns;
        self
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.printer.into_inner()
    }

    // --- Main loop ---

    /// Run until the operator exits or input ends.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        self.printer.banner("Persona AI simulation system")?;
        self.printer
            .line("Great minds from history, each with their own way of thinking.")?;

        loop {
            let Some(item) = self.main_menu().await? else {
                break;
            };
            if item == MainMenuItem::Exit {
                self.printer.blank()?;
                self.printer
                    .line("Shutting down. Thank you for using the system.")?;
                break;
            }

            match self.run_flow(item).await {
                Ok(Flow::Menu) => {}
                Ok(Flow::Exit) => break,
                Err(SessionError::Io(e)) => return Err(SessionError::Io(e)),
                Err(e) => {
                    log::warn!("{:?} ended with error: {}", item, e);
                    self.printer.blank()?;
                    self.printer
                        .print(&format!("Error: {}", e), PrinterColor::Red)?;
                }
            }
        }
        log::debug!("Console session finished");
        Ok(())
    }

    async fn main_menu(&mut self) -> Result<Option<MainMenuItem>, SessionError> {
        self.printer.banner("Main menu")?;
        let labels: Vec<String> = MainMenuItem::ALL
            .iter()
            .map(|i| i.label().to_string())
            .collect();
        Ok(self
            .choose("Select a mode:", &labels)
            .await?
            .map(|idx| MainMenuItem::ALL[idx]))
    }

    async fn run_flow(&mut self, item: MainMenuItem) -> FlowResult {
        match item {
            MainMenuItem::SinglePersonaChat => self.single_persona_chat().await,
            MainMenuItem::ScenarioChat => self.scenario_chat().await,
            MainMenuItem::MultiPersonaDiscussion => self.multi_persona_discussion().await,
            MainMenuItem::ProblemSolvingSession => self.problem_solving_session().await,
            MainMenuItem::ProblemSolvingBattle => self.problem_solving_battle().await,
            MainMenuItem::SpecializedConsultation => self.specialized_consultation().await,
            MainMenuItem::Exit => Ok(Flow::Exit),
        }
    }

    // --- Input helpers ---

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, SessionError> {
        self.printer.prompt(prompt)?;
        Ok(self.input.next_line().await?)
    }

    /// Numbered menu. Non-numbers re-show the menu; out-of-range numbers
    /// re-prompt. `None` when input ends.
    async fn choose(
        &mut self,
        heading: &str,
        items: &[String],
    ) -> Result<Option<usize>, SessionError> {
        loop {
            self.printer.blank()?;
            self.printer.line(heading)?;
            for (i, item) in items.iter().enumerate() {
                self.printer.line(&format!("{}. {}", i + 1, item))?;
            }

            loop {
                let Some(line) = self.read_line("\nChoice (number): ").await? else {
                    return Ok(None);
                };
                match parse_choice(&line, items.len()) {
                    Ok(idx) => return Ok(Some(idx)),
                    Err(e @ InvalidMenuInput::NotANumber) => {
                        self.printer.print(e.message(), PrinterColor::Yellow)?;
                        break;
                    }
                    Err(e @ InvalidMenuInput::OutOfRange) => {
                        self.printer.print(e.message(), PrinterColor::Yellow)?;
                    }
                }
            }
        }
    }

    async fn select_persona(&mut self) -> Result<Option<String>, SessionError> {
        let personas = self.catalog.list_personas();
        let names: Vec<String> = personas.iter().map(|(_, name)| name.clone()).collect();
        Ok(self
            .choose("Available personas:", &names)
            .await?
            .map(|idx| personas[idx].0.clone()))
    }

    async fn select_category(&mut self) -> Result<Option<(String, String)>, SessionError> {
        let categories = self.catalog.list_categories();
        let labels: Vec<String> = categories.iter().map(|(_, label)| label.clone()).collect();
        Ok(self
            .choose("Available categories:", &labels)
            .await?
            .map(|idx| categories[idx].clone()))
    }

    /// Pick `count` different personas; keys in selection order.
    async fn select_distinct_personas(
        &mut self,
        heading: &str,
        count: usize,
    ) -> Result<Option<Vec<String>>, SessionError> {
        let personas = self.catalog.list_personas();
        let mut chosen: Vec<usize> = Vec::with_capacity(count);

        self.printer.blank()?;
        self.printer.line(heading)?;
        while chosen.len() < count {
            self.printer.blank()?;
            self.printer
                .line(&format!("Participant {} of {}:", chosen.len() + 1, count))?;
            for (i, (_, name)) in personas.iter().enumerate() {
                if !chosen.contains(&i) {
                    self.printer.line(&format!("{}. {}", i + 1, name))?;
                }
            }

            loop {
                let Some(line) = self.read_line("\nChoice (number): ").await? else {
                    return Ok(None);
                };
                match parse_choice(&line, personas.len()) {
                    Ok(idx) if chosen.contains(&idx) => {
                        self.printer
                            .print(menu::ALREADY_SELECTED_MESSAGE, PrinterColor::Yellow)?;
                    }
                    Ok(idx) => {
                        chosen.push(idx);
                        break;
                    }
                    Err(e @ InvalidMenuInput::NotANumber) => {
                        self.printer.print(e.message(), PrinterColor::Yellow)?;
                        break;
                    }
                    Err(e @ InvalidMenuInput::OutOfRange) => {
                        self.printer.print(e.message(), PrinterColor::Yellow)?;
                    }
                }
            }
        }

        Ok(Some(
            chosen.into_iter().map(|i| personas[i].0.clone()).collect(),
        ))
    }

    /// Read a non-empty problem statement.
    async fn read_problem(&mut self) -> Result<Option<String>, SessionError> {
        loop {
            let Some(line) = self.read_line("\nProblem: ").await? else {
                return Ok(None);
            };
            let problem = line.trim();
            if !problem.is_empty() {
                return Ok(Some(problem.to_string()));
            }
            self.printer
                .print("Please describe the problem.", PrinterColor::Yellow)?;
        }
    }

    fn ensure_panel(&mut self) -> io::Result<bool> {
        if self.catalog.len() >= PANEL_SIZE {
            return Ok(true);
        }
        self.printer.print(
            &format!("At least {} personas are required.", PANEL_SIZE),
            PrinterColor::Yellow,
        )?;
        Ok(false)
    }

    /// Read lines and answer them until an exit keyword.
    ///
    /// `context` is prepended to the first question only.
    async fn chat_loop(
        &mut self,
        agent: Arc<dyn ChatAgent>,
        display_name: &str,
        exit_keywords: &[&str],
        farewell: &str,
        mut context: Option<String>,
    ) -> FlowResult {
        loop {
            self.printer.blank()?;
            let Some(line) = self.read_line("You: ").await? else {
                return Ok(Flow::Exit);
            };
            if is_exit_keyword(&line, exit_keywords) {
                self.printer.blank()?;
                self.printer.speaker(display_name, farewell)?;
                return Ok(Flow::Menu);
            }
            let question = line.trim();
            if question.is_empty() {
                continue;
            }

            let task = match context.take() {
                Some(ctx) => format!("{}\n\nQuestion: {}", ctx, question),
                None => question.to_string(),
            };
            let reply = agent.respond(&task).await?;
            self.printer.blank()?;
            self.printer.speaker(display_name, &reply)?;
        }
    }

    // --- Flows ---

    async fn single_persona_chat(&mut self) -> FlowResult {
        self.printer.banner("Single persona chat")?;
        let Some(persona_key) = self.select_persona().await? else {
            return Ok(Flow::Exit);
        };
        let Some((category_key, _)) = self.select_category().await? else {
            return Ok(Flow::Exit);
        };

        let persona = self.catalog.persona(&persona_key)?;
        let prompt = self
            .catalog
            .compose_category_prompt(&persona_key, &category_key)?;
        let agent = self.factory.create_agent(
            &names::category_agent(&persona_key, &category_key),
            &prompt,
        );

        self.printer.blank()?;
        self.printer.line(&format!(
            "Starting a conversation with {}.",
            persona.display_name
        ))?;
        self.printer.line("Type 'exit' or 'quit' to finish.")?;
        self.chat_loop(
            agent,
            &persona.display_name,
            CHAT_EXIT_KEYWORDS,
            "Until we meet again.",
            None,
        )
        .await
    }

    async fn scenario_chat(&mut self) -> FlowResult {
        self.printer.banner("Scenario questions")?;
        let Some(persona_key) = self.select_persona().await? else {
            return Ok(Flow::Exit);
        };
        let Some((category_key, category_label)) = self.select_category().await? else {
            return Ok(Flow::Exit);
        };

        let persona = self.catalog.persona(&persona_key)?;
        let prompt = self
            .catalog
            .compose_category_prompt(&persona_key, &category_key)?;
        let agent = self.factory.create_agent(
            &names::category_agent(&persona_key, &category_key),
            &prompt,
        );
        let questions = self.scenarios.questions(&category_key).to_vec();

        self.printer.blank()?;
        self.printer.line(&format!(
            "Questions for {} about {}:",
            persona.display_name, category_label
        ))?;
        self.printer.rule()?;
        if questions.is_empty() {
            self.printer
                .line("No scenario questions are defined for this category.")?;
        }

        for question in &questions {
            self.printer.blank()?;
            self.printer
                .print(&format!("Question: {}", question), PrinterColor::Cyan)?;
            let reply = agent.respond(question).await?;
            self.printer.speaker(&persona.display_name, &reply)?;
            self.printer.line(&"-".repeat(40))?;
        }
        Ok(Flow::Menu)
    }

    async fn multi_persona_discussion(&mut self) -> FlowResult {
        self.printer.banner("Multi-persona discussion")?;
        let Some((category_key, category_label)) = self.select_category().await? else {
            return Ok(Flow::Exit);
        };
        if !self.ensure_panel()? {
            return Ok(Flow::Menu);
        }
        let Some(keys) = self
            .select_distinct_personas("Choose 3 personas for the discussion:", PANEL_SIZE)
            .await?
        else {
            return Ok(Flow::Exit);
        };

        let mut agents: Vec<Arc<dyn ChatAgent>> = Vec::with_capacity(keys.len());
        // (agent name, display name)
        let mut speakers: Vec<(String, String)> = Vec::with_capacity(keys.len());
        for key in &keys {
            let persona = self.catalog.persona(key)?;
            let name = names::category_agent(key, &category_key);
            let prompt = self.catalog.compose_category_prompt(key, &category_key)?;
            agents.push(self.factory.create_agent(&name, &prompt));
            speakers.push((name, persona.display_name.clone()));
        }
        let topic = self.scenarios.discussion_topic(&category_key).to_string();

        self.printer.blank()?;
        self.printer
            .print(&format!("{} discussion", category_label), PrinterColor::BoldWhite)?;
        self.printer.line(&format!("Topic: {}", topic))?;
        self.printer.line(&format!(
            "Participants: {}",
            speakers
                .iter()
                .map(|(_, display)| display.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))?;
        self.printer.rule()?;

        let team = RoundRobinTeam::new(agents, self.discussion_turns);
        let mut stream = team.run_stream(&topic);
        while let Some(item) = stream.next().await {
            let message = item?;
            if let Some((_, display)) = speakers.iter().find(|(name, _)| *name == message.source) {
                self.printer.blank()?;
                self.printer.speaker(display, &message.content)?;
            }
        }
        Ok(Flow::Menu)
    }

    async fn problem_solving_session(&mut self) -> FlowResult {
        self.printer.banner("Problem-solving session")?;
        let records = self.catalog.records();
        let items: Vec<String> = records
            .iter()
            .map(|p| {
                format!(
                    "{}\n   Strengths: {}\n   Method: {}",
                    p.display_name,
                    p.strengths_label(),
                    p.framework_name().unwrap_or("-")
                )
            })
            .collect();
        let Some(idx) = self
            .choose("Choose the persona to solve your problem:", &items)
            .await?
        else {
            return Ok(Flow::Exit);
        };
        let persona = Arc::clone(&records[idx]);

        self.printer.blank()?;
        self.printer.line(&format!(
            "Describe the problem you want {} to solve.",
            persona.display_name
        ))?;
        self.printer
            .line("The more specific you are, the better the solution.")?;
        let Some(problem) = self.read_problem().await? else {
            return Ok(Flow::Exit);
        };

        let mut session =
            ProblemSolvingSession::new(&self.catalog, &persona.key, Arc::clone(&self.factory))?;

        self.printer.blank()?;
        self.printer.line(&format!(
            "{} is starting to work on your problem...",
            persona.display_name
        ))?;
        self.printer.rule()?;

        let printer = &mut self.printer;
        let mut stage_error: Option<io::Error> = None;
        let result = session
            .solve_problem(&problem, |stage| {
                if stage_error.is_none() {
                    if let Err(e) = printer
                        .blank()
                        .and_then(|_| printer.print(&format!("[{}]", stage), PrinterColor::Cyan))
                    {
                        stage_error = Some(e);
                    }
                }
            })
            .await?;
        if let Some(e) = stage_error {
            return Err(e.into());
        }

        self.printer
            .banner(&format!("{}'s solution", persona.display_name))?;
        self.printer
            .print("[Essence of the problem]", PrinterColor::Cyan)?;
        self.printer.line(&result.analysis.essence)?;
        self.printer.blank()?;
        self.printer.print("[Solution]", PrinterColor::Cyan)?;
        self.printer.line(&result.solution.summary)?;
        self.printer.blank()?;
        self.printer.print("[Action plan]", PrinterColor::Cyan)?;
        self.printer.line(&result.action_plan)?;

        let prompt = self.catalog.compose_problem_solving_prompt(&persona.key)?;
        let agent = self
            .factory
            .create_agent(&names::problem_solver(&persona.key), &prompt);
        let context = format!(
            "Problem: {}\nChosen solution: {}\nAction plan:\n{}",
            result.problem, result.solution.summary, result.action_plan
        );

        self.printer.blank()?;
        self.printer.line(&format!(
            "Ask {} follow-up questions. Type 'exit' to return to the menu.",
            persona.display_name
        ))?;
        self.chat_loop(
            agent,
            &persona.display_name,
            CONSULTATION_EXIT_KEYWORDS,
            "Now go and put the plan into action.",
            Some(context),
        )
        .await
    }

    async fn problem_solving_battle(&mut self) -> FlowResult {
        self.printer
            .banner("Problem-solving battle - great minds compete!")?;
        if !self.ensure_panel()? {
            return Ok(Flow::Menu);
        }
        let Some(keys) = self
            .select_distinct_personas("Choose 3 great minds for the battle:", PANEL_SIZE)
            .await?
        else {
            return Ok(Flow::Exit);
        };

        self.printer.blank()?;
        self.printer.line("Enter the problem to solve:")?;
        let Some(problem) = self.read_problem().await? else {
            return Ok(Flow::Exit);
        };

        let battle = ProblemSolvingBattle::new(&self.catalog, &keys, Arc::clone(&self.factory))?;

        self.printer.blank()?;
        self.printer.print("The battle begins!", PrinterColor::BoldWhite)?;
        self.printer.line(&format!("Problem: {}", problem))?;
        self.printer.rule()?;

        let printer = &mut self.printer;
        let mut print_error: Option<io::Error> = None;
        let result = battle
            .battle(&problem, |entry| {
                if print_error.is_none() {
                    let shown = printer
                        .blank()
                        .and_then(|_| {
                            printer.print(
                                &format!("[{}'s solution]", entry.display_name),
                                PrinterColor::Cyan,
                            )
                        })
                        .and_then(|_| {
                            printer.speaker(
                                &entry.display_name,
                                &preview(&entry.solution, BATTLE_PREVIEW_CHARS),
                            )
                        });
                    if let Err(e) = shown {
                        print_error = Some(e);
                    }
                }
            })
            .await?;
        if let Some(e) = print_error {
            return Err(e.into());
        }

        self.printer.banner("Judgment")?;
        self.printer.line(&result.judgment)?;
        Ok(Flow::Menu)
    }

    async fn specialized_consultation(&mut self) -> FlowResult {
        self.printer.banner("Specialized consultation")?;
        let Some((category_key, category_label)) = self.select_category().await? else {
            return Ok(Flow::Exit);
        };

        let experts = self.catalog.experts_for(&category_key);
        if experts.is_empty() {
            self.printer.print(
                &format!("No experts are registered for {}.", category_label),
                PrinterColor::Yellow,
            )?;
            return Ok(Flow::Menu);
        }

        self.printer.blank()?;
        self.printer
            .line(&format!("Experts in {}:", category_label))?;
        for expert in &experts {
            self.printer.line(&format!("- {}", expert.display_name))?;
        }
        let names_list: Vec<String> = experts.iter().map(|e| e.display_name.clone()).collect();
        let Some(idx) = self.choose("Choose the persona to consult:", &names_list).await? else {
            return Ok(Flow::Exit);
        };
        let expert = Arc::clone(&experts[idx]);

        let prompt = self
            .catalog
            .compose_specialist_prompt(&expert.key, &category_key)?;
        let agent = self
            .factory
            .create_agent(&names::specialist(&expert.key, &category_key), &prompt);

        self.printer.blank()?;
        self.printer.line(&format!(
            "Starting a {} consultation with {}.",
            category_label, expert.display_name
        ))?;
        self.printer.line("Type 'exit' to finish.")?;
        self.chat_loop(
            agent,
            &expert.display_name,
            CONSULTATION_EXIT_KEYWORDS,
            "Come back whenever you need advice.",
            None,
        )
        .await
    }
}
