//! Per-run context threaded through agents and tools.
//!
//! A [`RunContext`] is built once per orchestration run and passed by
//! reference into every agent step and tool call. It replaces process-wide
//! singletons: each run owns its artifact store handle, summarizer, optional
//! shared memory and cancellation token.

use crate::artifacts::ArtifactStore;
use crate::memory::SharedMemory;
use crate::summarize::BoundedSummarizer;
use crate::types::AgentName;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Read-only context shared by everything taking part in one run
#[derive(Clone)]
pub struct RunContext {
    pub run_id: String,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub summarizer: Arc<BoundedSummarizer>,
    pub memory: Option<Arc<dyn SharedMemory>>,
    pub cancel: CancellationToken,
}

impl RunContext {
    /// Context with a fresh run id, a truncating summarizer and no memory
    pub fn new(artifacts: Arc<dyn ArtifactStore>) -> Self {
        let summarizer = Arc::new(BoundedSummarizer::new(artifacts.clone()));
        Self {
            run_id: Uuid::new_v4().to_string(),
            artifacts,
            summarizer,
            memory: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<BoundedSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn SharedMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Narrow this context to one tool invocation
    pub fn for_tool<'a>(&'a self, caller: &'a AgentName) -> ToolContext<'a> {
        ToolContext { run: self, caller }
    }
}

/// What a tool sees of the run: the shared context plus who is calling
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub run: &'a RunContext,
    pub caller: &'a AgentName,
}

impl<'a> ToolContext<'a> {
    pub fn artifacts(&self) -> &Arc<dyn ArtifactStore> {
        &self.run.artifacts
    }

    pub fn summarizer(&self) -> &BoundedSummarizer {
        &self.run.summarizer
    }
}
