//! Multi-agent turn coordination.
//!
//! A [`TurnCoordinator`] decides who speaks next and streams the resulting
//! transcript. [`RoundRobinTeam`] is the only strategy shipped: agents speak
//! in a fixed rotation until a turn limit is reached.

use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::agent::ChatAgent;
use crate::error::LlmError;

/// Source attributed to the task that opens a run.
pub const USER_SOURCE: &str = "user";

/// One entry in a team transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMessage {
    /// Agent name, or [`USER_SOURCE`] for the opening task.
    pub source: String,
    pub content: String,
}

impl TeamMessage {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

impl fmt::Display for TeamMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.content)
    }
}

/// Drives a set of agents through a shared conversation.
pub trait TurnCoordinator: Send + Sync {
    /// Stream the transcript for `task`.
    ///
    /// The first item is the task itself. The stream is lazy: no agent is
    /// called until the consumer polls for its message. It ends after the
    /// first error.
    fn run_stream(&self, task: &str) -> BoxStream<'static, Result<TeamMessage, LlmError>>;

    /// Run to completion and collect the transcript.
    fn run(&self, task: &str) -> BoxFuture<'static, Result<Vec<TeamMessage>, LlmError>> {
        self.run_stream(task).try_collect().boxed()
    }
}

/// Agents speak in order, wrapping around, for at most `max_turns` turns.
#[derive(Debug, Clone)]
pub struct RoundRobinTeam {
    agents: Vec<Arc<dyn ChatAgent>>,
    max_turns: usize,
}

impl RoundRobinTeam {
    pub fn new(agents: Vec<Arc<dyn ChatAgent>>, max_turns: usize) -> Self {
        Self { agents, max_turns }
    }

    pub fn agents(&self) -> &[Arc<dyn ChatAgent>] {
        &self.agents
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }
}

/// Per-run state threaded through the stream.
struct RunState {
    agents: Vec<Arc<dyn ChatAgent>>,
    max_turns: usize,
    transcript: Vec<TeamMessage>,
    /// For each agent, how much of the transcript it has already been shown.
    seen: Vec<usize>,
    turn: usize,
    task_emitted: bool,
    finished: bool,
}

impl RunState {
    /// Everything the agent at `idx` has not seen yet, one message per block.
    fn unseen_for(&self, idx: usize) -> String {
        self.transcript[self.seen[idx]..]
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl TurnCoordinator for RoundRobinTeam {
    fn run_stream(&self, task: &str) -> BoxStream<'static, Result<TeamMessage, LlmError>> {
        let state = RunState {
            agents: self.agents.clone(),
            max_turns: self.max_turns,
            transcript: vec![TeamMessage::new(USER_SOURCE, task)],
            seen: vec![0; self.agents.len()],
            turn: 0,
            task_emitted: false,
            finished: false,
        };

        stream::unfold(state, |mut st| async move {
            if st.finished {
                return None;
            }
            if !st.task_emitted {
                st.task_emitted = true;
                let opening = st.transcript[0].clone();
                return Some((Ok(opening), st));
            }
            if st.agents.is_empty() || st.turn >= st.max_turns {
                return None;
            }

            let idx = st.turn % st.agents.len();
            let agent = Arc::clone(&st.agents[idx]);
            let pending = st.unseen_for(idx);
            st.turn += 1;
            log::debug!("Turn {} -> '{}'", st.turn, agent.name());

            match agent.respond(&pending).await {
                Ok(reply) => {
                    let message = TeamMessage::new(agent.name(), reply);
                    st.transcript.push(message.clone());
                    st.seen[idx] = st.transcript.len();
                    Some((Ok(message), st))
                }
                Err(e) => {
                    log::warn!("Agent '{}' failed: {}", agent.name(), e);
                    st.finished = true;
                    Some((Err(e), st))
                }
            }
        })
        .boxed()
    }
}
