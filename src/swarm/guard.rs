//! Revision-loop guard
//!
//! Counts reviewer handoffs per producer. Once a reviewer has sent work back
//! to the same producer `limit` times, its next handoff to that producer is
//! redirected to the finalizer so the run moves toward termination no matter
//! what the agents' own text says.

use crate::agents::AgentDescriptor;
use crate::swarm::state::OrchestrationState;
use crate::types::AgentName;

/// Default number of revision rounds a reviewer may request per producer
pub const DEFAULT_MAX_REVISIONS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed(AgentName),
    Redirect {
        requested: AgentName,
        to: AgentName,
        revisions: u32,
    },
}

impl GuardDecision {
    /// Agent that actually receives control
    pub fn target(&self) -> &AgentName {
        match self {
            GuardDecision::Proceed(target) => target,
            GuardDecision::Redirect { to, .. } => to,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RevisionGuard {
    limit: u32,
    finalizer: AgentName,
}

impl RevisionGuard {
    pub fn new(limit: u32, finalizer: AgentName) -> Self {
        Self { limit, finalizer }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn finalizer(&self) -> &AgentName {
        &self.finalizer
    }

    /// Decide where a handoff from `from` to `target` goes, updating counters
    pub fn route(
        &self,
        state: &mut OrchestrationState,
        from: &AgentDescriptor,
        target: &AgentName,
    ) -> GuardDecision {
        if !from.is_reviewer() || target == &self.finalizer {
            return GuardDecision::Proceed(target.clone());
        }

        let count = state
            .revision_count_per_target
            .entry(target.clone())
            .or_insert(0);
        *count += 1;

        if *count > self.limit {
            GuardDecision::Redirect {
                requested: target.clone(),
                to: self.finalizer.clone(),
                revisions: *count - 1,
            }
        } else {
            GuardDecision::Proceed(target.clone())
        }
    }
}
