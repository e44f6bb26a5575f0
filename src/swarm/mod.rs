//! Handoff-routing orchestrator
//!
//! A [`Swarm`] owns the transcript of a run and the pointer to the active
//! agent. Each turn it invokes exactly one agent, validates what the agent
//! asked for against its capability table, then acts on it:
//!
//! - a tool call is dispatched and its result appended; the agent keeps the turn
//! - a handoff moves the turn to the target, subject to the revision guard
//! - any message containing the termination token ends the run
//!
//! Contract violations (unknown tool for the agent, handoff outside the
//! declared targets), agent failures, cancellation and the round ceiling
//! abort the run with a distinguishable reason. Tool failures never do.

pub mod guard;
pub mod state;
pub mod transcript;

pub use guard::{GuardDecision, RevisionGuard, DEFAULT_MAX_REVISIONS};
pub use state::{AbortReason, OrchestrationState, RunState, TerminationReason};
pub use transcript::Transcript;

use crate::agents::Agent;
use crate::artifacts::ArtifactId;
use crate::context::RunContext;
use crate::memory::{is_memorable, MemoryFragment};
use crate::tools::ToolRegistry;
use crate::types::{AgentName, AppError, Message, MessageKind, Result};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Literal whose appearance in any message ends a run
pub const DEFAULT_TERMINATION_TOKEN: &str = "FINISHED";

/// Default ceiling on agent invocations per run
pub const DEFAULT_MAX_ROUNDS: u32 = 40;

/// Result of one orchestration run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: String,
    pub transcript: Transcript,
    pub state: OrchestrationState,
    pub final_state: RunState,
    /// Deliverable chosen as the run's result, only set on termination
    pub final_artifact: Option<ArtifactId>,
    /// Every deliverable written during the run, in order
    pub deliverables: Vec<ArtifactId>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self.final_state, RunState::Terminated(_))
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match &self.final_state {
            RunState::Aborted(reason) => Some(reason),
            _ => None,
        }
    }

    /// `done: <artifact>` or `aborted: <reason>`
    pub fn status_line(&self) -> String {
        match (&self.final_state, &self.final_artifact) {
            (RunState::Terminated(_), Some(artifact)) => format!("done: {}", artifact),
            (RunState::Terminated(_), None) => "done: no deliverable written".to_string(),
            (RunState::Aborted(reason), _) => format!("aborted: {}", reason.reason_code()),
            (RunState::Running(agent), _) => format!("running: {}", agent),
        }
    }

    /// Convert an aborted run into the matching error
    pub fn into_result(self) -> Result<RunOutcome> {
        match self.final_state {
            RunState::Aborted(reason) => Err(reason.into()),
            _ => Ok(self),
        }
    }
}

pub struct Swarm {
    agents: HashMap<AgentName, Arc<dyn Agent>>,
    order: Vec<AgentName>,
    tools: Arc<ToolRegistry>,
    entry: AgentName,
    guard: RevisionGuard,
    max_rounds: u32,
    termination_token: String,
}

impl Swarm {
    pub fn builder() -> SwarmBuilder {
        SwarmBuilder::default()
    }

    pub fn entry(&self) -> &AgentName {
        &self.entry
    }

    pub fn finalizer(&self) -> &AgentName {
        self.guard.finalizer()
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn termination_token(&self) -> &str {
        &self.termination_token
    }

    /// Agent names in registration order
    pub fn agent_names(&self) -> &[AgentName] {
        &self.order
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Drive one run from the seeded task to a terminal state.
    ///
    /// Never fails: every way a run can end is reported in
    /// [`RunOutcome::final_state`].
    pub async fn run(&self, task: impl Into<String>, ctx: &RunContext) -> RunOutcome {
        let started = Instant::now();
        let mut transcript = Transcript::seeded(task);
        let mut state = OrchestrationState::new(self.entry.clone());
        let mut deliverables: Vec<ArtifactId> = Vec::new();

        tracing::info!(
            run_id = %ctx.run_id,
            entry = %self.entry,
            max_rounds = self.max_rounds,
            "Research run started"
        );

        let final_state = loop {
            if ctx.is_cancelled() {
                break RunState::Aborted(AbortReason::Cancelled);
            }
            if state.round_count >= self.max_rounds {
                break RunState::Aborted(AbortReason::RoundCeilingExceeded {
                    max_rounds: self.max_rounds,
                });
            }

            match self
                .turn(&mut transcript, &mut state, &mut deliverables, ctx)
                .await
            {
                RunState::Running(_) => continue,
                terminal => break terminal,
            }
        };

        state.terminated = matches!(final_state, RunState::Terminated(_));
        let final_artifact = if state.terminated {
            pick_final_artifact(&deliverables, transcript.last())
        } else {
            None
        };

        match &final_state {
            RunState::Aborted(reason) => tracing::warn!(
                run_id = %ctx.run_id,
                round = state.round_count,
                reason = %reason,
                "Research run aborted"
            ),
            _ => tracing::info!(
                run_id = %ctx.run_id,
                round = state.round_count,
                handoffs = state.handoff_count,
                artifact = ?final_artifact.as_ref().map(ArtifactId::as_str),
                "Research run finished"
            ),
        }

        self.remember(&transcript, ctx).await;

        RunOutcome {
            run_id: ctx.run_id.clone(),
            transcript,
            state,
            final_state,
            final_artifact,
            deliverables,
            elapsed: started.elapsed(),
        }
    }

    /// One agent invocation and whatever it triggers
    async fn turn(
        &self,
        transcript: &mut Transcript,
        state: &mut OrchestrationState,
        deliverables: &mut Vec<ArtifactId>,
        ctx: &RunContext,
    ) -> RunState {
        state.round_count += 1;
        let active = state.active_agent.clone();

        let Some(agent) = self.agents.get(&active) else {
            return RunState::Aborted(AbortReason::AgentError {
                agent: active,
                message: "agent is not registered".to_string(),
            });
        };

        tracing::debug!(
            run_id = %ctx.run_id,
            round = state.round_count,
            agent = %active,
            "Turn started"
        );

        let produced = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => None,
            result = agent.step(transcript, state, ctx) => Some(result),
        };

        let mut message = match produced {
            None => return RunState::Aborted(AbortReason::Cancelled),
            Some(Err(e)) => {
                return RunState::Aborted(AbortReason::AgentError {
                    agent: active,
                    message: agent_error_message(e),
                })
            }
            Some(Ok(message)) => message,
        };
        message.sender = active.clone();

        if message.content.contains(&self.termination_token) {
            tracing::info!(
                run_id = %ctx.run_id,
                agent = %active,
                kind = message.kind.as_str(),
                "Termination token received"
            );
            transcript.push(message);
            return RunState::Terminated(TerminationReason::Sentinel);
        }

        let descriptor = agent.descriptor();
        match message.kind {
            MessageKind::ToolCall => {
                let tool = message.tool_name.clone().unwrap_or_default();
                if !descriptor.can_use_tool(&tool) {
                    return RunState::Aborted(AbortReason::UnauthorizedTool {
                        agent: active,
                        tool,
                    });
                }

                let args = message.tool_args.clone().unwrap_or_else(|| json!({}));
                transcript.push(message);

                // Not raced against cancellation: a started tool call always
                // gets its result recorded.
                let outcome = self.tools.dispatch(&tool, args, ctx.for_tool(&active)).await;
                tracing::debug!(
                    run_id = %ctx.run_id,
                    agent = %active,
                    tool = %tool,
                    success = outcome.success,
                    "Tool result recorded"
                );

                transcript.push(Message::tool_result(active.clone(), tool, outcome.content));
                if let Some(artifact) = outcome.deliverable {
                    deliverables.push(artifact);
                }
            }
            MessageKind::Handoff => {
                let target = match &message.target {
                    Some(target) if descriptor.can_hand_off_to(target) => target.clone(),
                    other => {
                        return RunState::Aborted(AbortReason::IllegalHandoff {
                            from: active,
                            to: other.clone().unwrap_or_else(|| AgentName::new("")),
                        })
                    }
                };
                transcript.push(message);

                let decision = self.guard.route(state, descriptor, &target);
                if let GuardDecision::Redirect {
                    requested,
                    to,
                    revisions,
                } = &decision
                {
                    tracing::info!(
                        run_id = %ctx.run_id,
                        from = %active,
                        requested = %requested,
                        to = %to,
                        revisions,
                        "Revision limit reached, redirecting handoff"
                    );
                    transcript.push(Message::text(
                        AgentName::orchestrator(),
                        format!(
                            "Revision limit of {} reached for {}. Control passes to {} to finalize the task.",
                            self.guard.limit(),
                            requested,
                            to
                        ),
                    ));
                }

                state.active_agent = decision.target().clone();
                state.handoff_count += 1;
                tracing::info!(
                    run_id = %ctx.run_id,
                    round = state.round_count,
                    from = %active,
                    to = %state.active_agent,
                    "Handoff"
                );
            }
            _ => transcript.push(message),
        }

        RunState::Running(state.active_agent.clone())
    }

    /// Append the run's agent messages to shared memory, if configured
    async fn remember(&self, transcript: &Transcript, ctx: &RunContext) {
        let Some(memory) = &ctx.memory else {
            return;
        };

        for message in transcript.iter().filter(|m| is_memorable(m)) {
            let fragment = MemoryFragment::from_message(&ctx.run_id, message);
            if let Err(e) = memory.append(fragment).await {
                tracing::warn!(run_id = %ctx.run_id, error = %e, "Failed to store memory fragment");
                return;
            }
        }
    }
}

fn agent_error_message(error: AppError) -> String {
    match error {
        AppError::Agent(message) | AppError::LLM(message) => message,
        other => other.to_string(),
    }
}

/// Deliverable named in the terminating message, otherwise the latest one
fn pick_final_artifact(deliverables: &[ArtifactId], last: Option<&Message>) -> Option<ArtifactId> {
    let mentioned = last.and_then(|message| {
        deliverables
            .iter()
            .rev()
            .find(|id| message.content.contains(id.as_str()))
    });

    mentioned.or_else(|| deliverables.last()).cloned()
}

/// Validating builder for [`Swarm`]
pub struct SwarmBuilder {
    agents: Vec<Arc<dyn Agent>>,
    tools: Option<Arc<ToolRegistry>>,
    entry: Option<AgentName>,
    finalizer: Option<AgentName>,
    max_rounds: u32,
    max_revisions: u32,
    termination_token: String,
}

impl Default for SwarmBuilder {
    fn default() -> Self {
        Self {
            agents: Vec::new(),
            tools: None,
            entry: None,
            finalizer: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_revisions: DEFAULT_MAX_REVISIONS,
            termination_token: DEFAULT_TERMINATION_TOKEN.to_string(),
        }
    }
}

impl SwarmBuilder {
    pub fn agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = Arc<dyn Agent>>) -> Self {
        self.agents.extend(agents);
        self
    }

    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Entry agent; defaults to the first registered agent
    pub fn entry(mut self, entry: impl Into<AgentName>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    /// Terminal-adjacent agent used by the revision guard; defaults to the entry
    pub fn finalizer(mut self, finalizer: impl Into<AgentName>) -> Self {
        self.finalizer = Some(finalizer.into());
        self
    }

    pub fn max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn max_revisions(mut self, max_revisions: u32) -> Self {
        self.max_revisions = max_revisions;
        self
    }

    pub fn termination_token(mut self, token: impl Into<String>) -> Self {
        self.termination_token = token.into();
        self
    }

    pub fn build(self) -> Result<Swarm> {
        if self.agents.is_empty() {
            return Err(AppError::Configuration(
                "a swarm needs at least one agent".to_string(),
            ));
        }
        if self.max_rounds == 0 {
            return Err(AppError::Configuration(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.termination_token.trim().is_empty() {
            return Err(AppError::Configuration(
                "termination token must not be empty".to_string(),
            ));
        }

        let tools = self.tools.unwrap_or_default();
        let mut agents: HashMap<AgentName, Arc<dyn Agent>> = HashMap::new();
        let mut order = Vec::new();

        for agent in self.agents {
            let name = agent.name().clone();
            if agents.contains_key(&name) {
                return Err(AppError::Configuration(format!(
                    "duplicate agent name '{}'",
                    name
                )));
            }
            order.push(name.clone());
            agents.insert(name, agent);
        }

        for agent in agents.values() {
            let descriptor = agent.descriptor();
            for target in &descriptor.handoff_targets {
                if !agents.contains_key(target) {
                    return Err(AppError::Configuration(format!(
                        "agent '{}' hands off to unknown agent '{}'",
                        descriptor.name, target
                    )));
                }
            }
            for tool in &descriptor.tool_names {
                if !tools.has_tool(tool) {
                    return Err(AppError::Configuration(format!(
                        "agent '{}' uses unregistered tool '{}'",
                        descriptor.name, tool
                    )));
                }
            }
        }

        let entry = match self.entry {
            Some(entry) => entry,
            None => order[0].clone(),
        };
        if !agents.contains_key(&entry) {
            return Err(AppError::Configuration(format!(
                "entry agent '{}' is not registered",
                entry
            )));
        }

        let finalizer = self.finalizer.unwrap_or_else(|| entry.clone());
        if !agents.contains_key(&finalizer) {
            return Err(AppError::Configuration(format!(
                "finalizer '{}' is not registered",
                finalizer
            )));
        }

        for agent in agents.values() {
            let descriptor = agent.descriptor();
            if descriptor.is_reviewer() && !descriptor.can_hand_off_to(&finalizer) {
                return Err(AppError::Configuration(format!(
                    "reviewer '{}' must be able to hand off to the finalizer '{}'",
                    descriptor.name, finalizer
                )));
            }
        }

        Ok(Swarm {
            agents,
            order,
            tools,
            entry,
            guard: RevisionGuard::new(self.max_revisions, finalizer),
            max_rounds: self.max_rounds,
            termination_token: self.termination_token,
        })
    }
}
