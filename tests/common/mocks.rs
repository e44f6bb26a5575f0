//! Mock implementations for testing.
//!
//! Scripted LLM clients, scripted agents, a canned search provider and a few
//! misbehaving tools, shared across the integration test files.

use async_trait::async_trait;
use deep_research::agents::{Agent, AgentDescriptor};
use deep_research::context::{RunContext, ToolContext};
use deep_research::llm::{LLMClient, LLMResponse};
use deep_research::swarm::{OrchestrationState, Transcript};
use deep_research::tools::scrape::ContentExtractor;
use deep_research::tools::{SearchHit, SearchProvider, SearchResults, Tool};
use deep_research::types::{AppError, Message, Result, ToolCall, ToolDefinition};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// LLM client that replays queued responses.
///
/// Once the queue is empty the last response is repeated. Every call to
/// `generate_with_tools` records the conversation and the offered tool names.
pub struct MockLLMClient {
    responses: Mutex<VecDeque<LLMResponse>>,
    last: Mutex<Option<LLMResponse>>,
    should_fail: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

/// One recorded `generate_with_tools` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<(String, String)>,
    pub tools: Vec<String>,
}

impl MockLLMClient {
    /// Client that always answers with `response`
    pub fn new(response: &str) -> Self {
        Self::scripted(vec![LLMResponse::text(response)])
    }

    /// Client that answers with `responses` in order
    pub fn scripted(responses: Vec<LLMResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Client whose every call fails
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::scripted(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn next(&self) -> Result<LLMResponse> {
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }

        let mut last = self.last.lock();
        match self.responses.lock().pop_front() {
            Some(response) => {
                *last = Some(response.clone());
                Ok(response)
            }
            None => last
                .clone()
                .ok_or_else(|| AppError::LLM("Mock LLM has no responses".to_string())),
        }
    }
}

/// Response asking for one tool call
pub fn tool_call_response(name: &str, arguments: Value) -> LLMResponse {
    LLMResponse {
        content: String::new(),
        tool_calls: vec![ToolCall {
            id: format!("call_{}", name),
            name: name.to_string(),
            arguments,
        }],
        finish_reason: "tool_calls".to_string(),
    }
}

/// Response transferring control through the synthetic handoff function
pub fn transfer_response(target: &str, message: &str) -> LLMResponse {
    tool_call_response(
        &format!("transfer_to_{}", target),
        json!({ "message": message }),
    )
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.next()?.content)
    }

    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        Ok(self.next()?.content)
    }


    async fn generate_with_tools(
        &self,
        messages: &[(String, String)],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.calls.lock().push(RecordedCall {
            messages: messages.to_vec(),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
        });
        self.next()
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Agent replaying a fixed list of messages.
///
/// A cycling agent starts over when the script runs out; a one-shot agent
/// fails its next step instead.
pub struct ScriptedAgent {
    descriptor: AgentDescriptor,
    script: Vec<Message>,
    cycle: bool,
    steps: AtomicUsize,
    seen_rounds: Mutex<Vec<u32>>,
}

impl ScriptedAgent {
    pub fn new(descriptor: AgentDescriptor, script: Vec<Message>) -> Self {
        Self {
            descriptor,
            script,
            cycle: false,
            steps: AtomicUsize::new(0),
            seen_rounds: Mutex::new(Vec::new()),
        }
    }

    pub fn cycling(descriptor: AgentDescriptor, script: Vec<Message>) -> Self {
        Self {
            cycle: true,
            ..Self::new(descriptor, script)
        }
    }

    /// Number of times the orchestrator invoked this agent
    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::SeqCst)
    }

    /// `round_count` observed at each invocation
    pub fn seen_rounds(&self) -> Vec<u32> {
        self.seen_rounds.lock().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn step(
        &self,
        _transcript: &Transcript,
        state: &OrchestrationState,
        _ctx: &RunContext,
    ) -> Result<Message> {
        self.seen_rounds.lock().push(state.round_count);
        let step = self.steps.fetch_add(1, Ordering::SeqCst);

        let index = if self.cycle && !self.script.is_empty() {
            step % self.script.len()
        } else {
            step
        };

        self.script.get(index).cloned().ok_or_else(|| {
            AppError::Agent(format!("{} ran out of scripted messages", self.descriptor.name))
        })
    }
}

/// Agent whose every step fails with the given error message
pub struct FailingAgent {
    descriptor: AgentDescriptor,
    message: String,
}

impl FailingAgent {
    pub fn new(descriptor: AgentDescriptor, message: &str) -> Self {
        Self {
            descriptor,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Agent for FailingAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn step(
        &self,
        _transcript: &Transcript,
        _state: &OrchestrationState,
        _ctx: &RunContext,
    ) -> Result<Message> {
        Err(AppError::LLM(self.message.clone()))
    }
}

/// Agent that takes `delay` to produce a plain text message
pub struct SlowAgent {
    descriptor: AgentDescriptor,
    delay: Duration,
}

impl SlowAgent {
    pub fn new(descriptor: AgentDescriptor, delay: Duration) -> Self {
        Self { descriptor, delay }
    }
}

#[async_trait]
impl Agent for SlowAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn step(
        &self,
        _transcript: &Transcript,
        _state: &OrchestrationState,
        _ctx: &RunContext,
    ) -> Result<Message> {
        tokio::time::sleep(self.delay).await;
        Ok(Message::text(self.descriptor.name.clone(), "still thinking"))
    }
}

/// Search provider returning `count` numbered hits for any query
pub struct StubSearchProvider {
    count: usize,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StubSearchProvider {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// `(query, max_results)` of every search received
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

pub fn numbered_hit(i: usize) -> SearchHit {
    SearchHit {
        title: format!("Sodium-ion progress report {}", i),
        url: format!("https://example.org/reports/{}", i),
        body: format!(
            "Report {} covers cathode chemistry, cycle life and cost per kilowatt hour \
             for grid storage deployments across several regions in considerable detail",
            i
        ),
    }
}

#[async_trait]
impl SearchProvider for StubSearchProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResults> {
        self.queries.lock().push((query.to_string(), max_results));
        // Providers may return more than asked for; the tool must cut the list.
        Ok(SearchResults::from_hits(
            (0..self.count).map(numbered_hit).collect(),
        ))
    }
}

/// Extractor returning fixed text and recording every URL it was asked for
pub struct RecordingExtractor {
    text: String,
    urls: Mutex<Vec<String>>,
}

impl RecordingExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl ContentExtractor for RecordingExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        self.urls.lock().push(url.to_string());
        Ok(self.text.clone())
    }
}

/// Tool that sleeps before answering `"slow done"`
pub struct SlowTool {
    pub delay: Duration,
}

#[async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "slow_tool"
    }

    fn description(&self) -> &str {
        "Sleeps, then answers"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value, _ctx: ToolContext<'_>) -> Result<Value> {
        tokio::time::sleep(self.delay).await;
        Ok(json!("slow done"))
    }
}

/// Tool that always fails with a tool error
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "flaky_tool"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value, _ctx: ToolContext<'_>) -> Result<Value> {
        Err(AppError::tool("flaky_tool", "Upstream service unavailable."))
    }
}
