//! Agents taking part in a research run
//!
//! An agent is a named role bound to a static capability table: the tools it
//! may call and the agents it may hand control to. The orchestrator validates
//! every request against that table before acting on it, so the table is
//! plain data on [`AgentDescriptor`] rather than behaviour.
//!
//! - [`LlmAgent`] turns each turn into one model call
//! - [`roles`] holds the built-in research team and its prompts
//! - [`AgentRegistry`] builds agents and the swarm from configuration

/// Agent backed by a language model.
pub mod llm_agent;
/// Configuration-driven agent construction.
pub mod registry;
/// Default research team.
pub mod roles;

use crate::context::RunContext;
use crate::swarm::{OrchestrationState, Transcript};
use crate::types::{AgentName, Message, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub use llm_agent::LlmAgent;
pub use registry::AgentRegistry;
pub use roles::default_team;

/// Closed set of roles an agent can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Decomposes the task and finalizes the run
    Planner,
    /// Gathers sources with search and scrape tools
    Searcher,
    /// Synthesizes findings into a deliverable
    Writer,
    /// Reviews deliverables and requests revisions
    Critic,
    /// Anything configured by the user without a built-in prompt
    Custom,
}

impl Role {
    /// Reviewer handoffs are subject to the revision-loop guard
    pub fn is_reviewer(&self) -> bool {
        matches!(self, Role::Critic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Planner => "planner",
            Role::Searcher => "searcher",
            Role::Writer => "writer",
            Role::Critic => "critic",
            Role::Custom => "custom",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much shared memory an agent gets to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryView {
    /// Maximum fragments recalled per turn
    pub limit: usize,
}

/// Static description of an agent. Read-only once a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub name: AgentName,
    pub role: Role,
    pub description: String,
    /// Behavioural instructions, used as the system prompt
    pub instructions: String,
    pub tool_names: BTreeSet<String>,
    pub handoff_targets: BTreeSet<AgentName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryView>,
}

impl AgentDescriptor {
    /// Descriptor with the role's built-in description and instructions
    pub fn new(name: impl Into<AgentName>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            description: roles::default_description(role).to_string(),
            instructions: roles::default_instructions(role).to_string(),
            tool_names: BTreeSet::new(),
            handoff_targets: BTreeSet::new(),
            memory: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_names.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn with_handoffs<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AgentName>,
    {
        self.handoff_targets
            .extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn with_memory(mut self, limit: usize) -> Self {
        self.memory = Some(MemoryView { limit });
        self
    }

    pub fn can_use_tool(&self, tool: &str) -> bool {
        self.tool_names.contains(tool)
    }

    pub fn can_hand_off_to(&self, target: &AgentName) -> bool {
        self.handoff_targets.contains(target)
    }

    pub fn is_reviewer(&self) -> bool {
        self.role.is_reviewer()
    }
}

/// A participant in the turn-taking loop.
///
/// Each call to [`Agent::step`] produces exactly one message: text, a tool
/// call, a handoff or a termination. Agents only read the transcript; the
/// orchestrator owns and appends to it.
#[async_trait]
pub trait Agent: Send + Sync {
    fn descriptor(&self) -> &AgentDescriptor;

    fn name(&self) -> &AgentName {
        &self.descriptor().name
    }

    async fn step(
        &self,
        transcript: &Transcript,
        state: &OrchestrationState,
        ctx: &RunContext,
    ) -> Result<Message>;
}
