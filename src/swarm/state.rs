use crate::types::{AgentName, AppError};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Mutable bookkeeping of a run, owned by the orchestrator
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationState {
    pub active_agent: AgentName,
    /// Agent invocations so far
    pub round_count: u32,
    pub handoff_count: u32,
    pub terminated: bool,
    /// Reviewer handoffs seen per producer
    pub revision_count_per_target: HashMap<AgentName, u32>,
}

impl OrchestrationState {
    pub fn new(entry: AgentName) -> Self {
        Self {
            active_agent: entry,
            round_count: 0,
            handoff_count: 0,
            terminated: false,
            revision_count_per_target: HashMap::new(),
        }
    }

    pub fn revisions_for(&self, producer: &AgentName) -> u32 {
        self.revision_count_per_target
            .get(producer)
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// An agent emitted the termination token
    Sentinel,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Sentinel => f.write_str("sentinel"),
        }
    }
}

/// Why a run stopped without converging
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbortReason {
    UnauthorizedTool { agent: AgentName, tool: String },
    IllegalHandoff { from: AgentName, to: AgentName },
    RoundCeilingExceeded { max_rounds: u32 },
    AgentError { agent: AgentName, message: String },
    Cancelled,
}

impl AbortReason {
    /// Stable, human-readable reason code
    pub fn reason_code(&self) -> &'static str {
        match self {
            AbortReason::UnauthorizedTool { .. } => "unauthorized tool",
            AbortReason::IllegalHandoff { .. } => "illegal handoff",
            AbortReason::RoundCeilingExceeded { .. } => "round ceiling exceeded",
            AbortReason::AgentError { .. } => "agent error",
            AbortReason::Cancelled => "cancelled",
        }
    }

    /// Participant misbehaved, as opposed to the task not converging
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            AbortReason::UnauthorizedTool { .. } | AbortReason::IllegalHandoff { .. }
        )
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::UnauthorizedTool { agent, tool } => {
                write!(f, "unauthorized tool ({} requested '{}')", agent, tool)
            }
            AbortReason::IllegalHandoff { from, to } => {
                write!(f, "illegal handoff ({} -> {})", from, to)
            }
            AbortReason::RoundCeilingExceeded { max_rounds } => {
                write!(f, "round ceiling exceeded ({} rounds)", max_rounds)
            }
            AbortReason::AgentError { agent, message } => {
                write!(f, "agent error ({}: {})", agent, message)
            }
            AbortReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

impl From<AbortReason> for AppError {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::UnauthorizedTool { agent, tool } => AppError::UnauthorizedTool {
                agent: agent.to_string(),
                tool,
            },
            AbortReason::IllegalHandoff { from, to } => AppError::IllegalHandoff {
                from: from.to_string(),
                to: to.to_string(),
            },
            AbortReason::RoundCeilingExceeded { max_rounds } => {
                AppError::RoundCeilingExceeded(max_rounds)
            }
            AbortReason::AgentError { agent, message } => {
                AppError::Agent(format!("{}: {}", agent, message))
            }
            AbortReason::Cancelled => AppError::Internal("run cancelled".to_string()),
        }
    }
}

/// State machine position of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum RunState {
    Running(AgentName),
    Terminated(TerminationReason),
    Aborted(AbortReason),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        let illegal = AbortReason::IllegalHandoff {
            from: "PlannerAgent".into(),
            to: "Nobody".into(),
        };
        assert_eq!(illegal.reason_code(), "illegal handoff");
        assert!(illegal.is_contract_violation());
        assert_eq!(illegal.to_string(), "illegal handoff (PlannerAgent -> Nobody)");

        let ceiling = AbortReason::RoundCeilingExceeded { max_rounds: 5 };
        assert_eq!(ceiling.reason_code(), "round ceiling exceeded");
        assert!(!ceiling.is_contract_violation());
        assert!(matches!(AppError::from(ceiling), AppError::RoundCeilingExceeded(5)));
    }

    #[test]
    fn test_run_state_terminality() {
        assert!(!RunState::Running("PlannerAgent".into()).is_terminal());
        assert!(RunState::Terminated(TerminationReason::Sentinel).is_terminal());
        assert!(RunState::Aborted(AbortReason::Cancelled).is_terminal());
    }
}
