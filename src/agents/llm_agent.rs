//! Language-model backed agent
//!
//! Each turn is one `generate_with_tools` call. The model sees the agent's
//! allowed tools plus one synthetic `transfer_to_<Agent>` function per
//! handoff target, and its response is mapped onto exactly one message:
//!
//! 1. a `transfer_to_<Agent>` call becomes a handoff,
//! 2. any other function call becomes a tool call,
//! 3. text containing the termination token becomes a termination,
//! 4. text containing a `transfer_to_<Agent>` directive becomes a handoff,
//! 5. anything else is plain text.
//!
//! Step 4 keeps handoffs working with models that lack function calling.

use crate::agents::{Agent, AgentDescriptor};
use crate::context::RunContext;
use crate::llm::LLMClient;
use crate::memory::{estimate_tokens, format_fragments_for_prompt};
use crate::swarm::{OrchestrationState, Transcript, DEFAULT_TERMINATION_TOKEN};
use crate::tools::ToolRegistry;
use crate::types::{AgentName, Message, MessageKind, Result, ToolDefinition};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};

/// Prefix of the synthetic handoff functions
pub const TRANSFER_PREFIX: &str = "transfer_to_";

/// Estimated tokens of transcript history sent per turn
pub const DEFAULT_HISTORY_TOKEN_BUDGET: usize = 12_000;

static TRANSFER_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"transfer_to_([A-Za-z0-9_\-]+)").expect("transfer pattern is a valid regex")
});

pub struct LlmAgent {
    descriptor: AgentDescriptor,
    llm: Arc<dyn LLMClient>,
    tools: Arc<ToolRegistry>,
    /// Descriptions of the handoff targets, shown to the model
    roster: Vec<(AgentName, String)>,
    termination_token: String,
    may_finish: bool,
    history_token_budget: usize,
}

impl LlmAgent {
    pub fn new(descriptor: AgentDescriptor, llm: Arc<dyn LLMClient>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            descriptor,
            llm,
            tools,
            roster: Vec::new(),
            termination_token: DEFAULT_TERMINATION_TOKEN.to_string(),
            may_finish: false,
            history_token_budget: DEFAULT_HISTORY_TOKEN_BUDGET,
        }
    }

    /// Describe teammates; only handoff targets are kept
    pub fn with_roster(mut self, team: &[AgentDescriptor]) -> Self {
        self.roster = team
            .iter()
            .filter(|d| self.descriptor.can_hand_off_to(&d.name))
            .map(|d| (d.name.clone(), d.description.clone()))
            .collect();
        self
    }

    /// Token that ends the run; `may_finish` tells the model it may emit it
    pub fn with_termination_token(mut self, token: impl Into<String>, may_finish: bool) -> Self {
        self.termination_token = token.into();
        self.may_finish = may_finish;
        self
    }

    pub fn with_history_token_budget(mut self, budget: usize) -> Self {
        self.history_token_budget = budget;
        self
    }

    fn handoff_definitions(&self) -> Vec<ToolDefinition> {
        self.descriptor
            .handoff_targets
            .iter()
            .map(|target| {
                let about = self
                    .roster
                    .iter()
                    .find(|(name, _)| name == target)
                    .map(|(_, description)| format!(" {}", description))
                    .unwrap_or_default();

                ToolDefinition {
                    name: format!("{}{}", TRANSFER_PREFIX, target),
                    description: format!("Hand control of the conversation to {}.{}", target, about),
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "message": {
                                "type": "string",
                                "description": format!("Instructions or results for {}", target)
                            }
                        }
                    }),
                }
            })
            .collect()
    }

    async fn system_prompt(&self, transcript: &Transcript, ctx: &RunContext) -> String {
        let mut prompt = self.descriptor.instructions.clone();

        if !self.descriptor.handoff_targets.is_empty() {
            prompt.push_str("\n\nYou can hand control to:\n");
            for target in &self.descriptor.handoff_targets {
                let about = self
                    .roster
                    .iter()
                    .find(|(name, _)| name == target)
                    .map(|(_, d)| d.as_str())
                    .unwrap_or("teammate");
                prompt.push_str(&format!("- {}: {}\n", target, about));
            }
            prompt.push_str(&format!(
                "To hand over, call the {}<Name> function. If you cannot call functions, \
                 write {}<Name> in your reply.",
                TRANSFER_PREFIX, TRANSFER_PREFIX
            ));
        }

        if self.may_finish {
            prompt.push_str(&format!(
                "\n\nWhen the whole task is complete, include the word {} in your reply.",
                self.termination_token
            ));
        } else {
            prompt.push_str(&format!(
                "\n\nNever write the word {}; only the coordinator ends the task.",
                self.termination_token
            ));
        }

        if let (Some(view), Some(memory), Some(task)) =
            (self.descriptor.memory, ctx.memory.as_ref(), transcript.task())
        {
            match memory.query(task, view.limit).await {
                Ok(fragments) => {
                    let notes = format_fragments_for_prompt(&fragments);
                    if !notes.is_empty() {
                        prompt.push_str("\n\n");
                        prompt.push_str(&notes);
                    }
                }
                Err(e) => {
                    tracing::warn!(agent = %self.descriptor.name, error = %e, "Memory query failed");
                }
            }
        }

        prompt
    }

    /// Render the transcript from this agent's point of view, newest messages
    /// kept first when the history budget is exceeded. The task is always kept.
    fn conversation(&self, transcript: &Transcript) -> Vec<(String, String)> {
        let me = &self.descriptor.name;
        let rendered: Vec<(String, String)> = transcript
            .messages()
            .iter()
            .map(|m| render_message(m, me))
            .collect();

        let Some((first, rest)) = rendered.split_first() else {
            return Vec::new();
        };

        let mut budget = self.history_token_budget.saturating_sub(estimate_tokens(&first.1));
        let mut kept = Vec::new();
        for entry in rest.iter().rev() {
            let cost = estimate_tokens(&entry.1);
            if cost > budget {
                break;
            }
            budget -= cost;
            kept.push(entry.clone());
        }
        kept.push(first.clone());
        kept.reverse();
        kept
    }

    /// Map one model response onto one transcript message
    pub(crate) fn interpret(&self, content: &str, tool_calls: &[crate::types::ToolCall]) -> Message {
        let me = self.descriptor.name.clone();
        let content = content.trim();

        if tool_calls.len() > 1 {
            tracing::debug!(
                agent = %me,
                ignored = tool_calls.len() - 1,
                "Model requested several calls, keeping the first"
            );
        }

        if let Some(call) = tool_calls.first() {
            if let Some(target) = call.name.strip_prefix(TRANSFER_PREFIX) {
                let note = call
                    .arguments
                    .get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        if content.is_empty() {
                            format!("Transferring to {}", target)
                        } else {
                            content.to_string()
                        }
                    });
                return Message::handoff(me, target, note);
            }

            let args = match &call.arguments {
                Value::Null => json!({}),
                other => other.clone(),
            };
            let message = Message::tool_call(me, call.name.clone(), args);
            return if content.is_empty() {
                message
            } else {
                message.with_content(content)
            };
        }

        if content.contains(&self.termination_token) {
            return Message::termination(me, content);
        }

        if let Some(captures) = TRANSFER_DIRECTIVE.captures(content) {
            return Message::handoff(me, &captures[1], content);
        }

        Message::text(me, content)
    }
}

fn render_message(message: &Message, me: &AgentName) -> (String, String) {
    let own = &message.sender == me;

    match message.kind {
        MessageKind::ToolCall if own => (
            "assistant".to_string(),
            format!(
                "{}\n[called {} with {}]",
                message.content,
                message.tool_name.as_deref().unwrap_or("unknown"),
                message.tool_args.clone().unwrap_or(Value::Null)
            ),
        ),
        MessageKind::ToolResult if own => (
            "user".to_string(),
            format!(
                "[{} result]\n{}",
                message.tool_name.as_deref().unwrap_or("tool"),
                message.content
            ),
        ),
        MessageKind::Handoff if own => (
            "assistant".to_string(),
            format!(
                "{}\n[handed off to {}]",
                message.content,
                message.target.as_ref().map(AgentName::as_str).unwrap_or("nobody")
            ),
        ),
        _ if own => ("assistant".to_string(), message.content.clone()),
        _ if message.sender.as_str() == AgentName::USER => {
            ("user".to_string(), message.content.clone())
        }
        MessageKind::Handoff => (
            "user".to_string(),
            format!(
                "[{} -> {}] {}",
                message.sender,
                message.target.as_ref().map(AgentName::as_str).unwrap_or("?"),
                message.content
            ),
        ),
        MessageKind::ToolResult => (
            "user".to_string(),
            format!(
                "[{} got {} result]\n{}",
                message.sender,
                message.tool_name.as_deref().unwrap_or("tool"),
                message.content
            ),
        ),
        _ => (
            "user".to_string(),
            format!("[{}] {}", message.sender, message.content),
        ),
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn step(
        &self,
        transcript: &Transcript,
        state: &OrchestrationState,
        ctx: &RunContext,
    ) -> Result<Message> {
        let system = self.system_prompt(transcript, ctx).await;

        let mut messages = vec![("system".to_string(), system)];
        messages.extend(self.conversation(transcript));

        let mut definitions = self
            .tools
            .get_tool_definitions_for(self.descriptor.tool_names.iter().map(String::as_str));
        definitions.extend(self.handoff_definitions());

        tracing::debug!(
            agent = %self.descriptor.name,
            round = state.round_count,
            model = self.llm.model_name(),
            history = messages.len(),
            tools = definitions.len(),
            "Calling model"
        );

        let response = self.llm.generate_with_tools(&messages, &definitions).await?;
        Ok(self.interpret(&response.content, &response.tool_calls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Role;
    use crate::llm::LLMResponse;
    use crate::types::ToolCall;

    struct NoopLlm;

    #[async_trait]
    impl LLMClient for NoopLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }

        async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }


        async fn generate_with_tools(
            &self,
            _messages: &[(String, String)],
            _tools: &[ToolDefinition],
        ) -> Result<LLMResponse> {
            Ok(LLMResponse::text(""))
        }

        fn model_name(&self) -> &str {
            "noop"
        }
    }

    fn agent() -> LlmAgent {
        let descriptor = AgentDescriptor::new("CriticAgent", Role::Critic)
            .with_tools(["read_file"])
            .with_handoffs(["WriterAgent", "PlannerAgent"]);
        LlmAgent::new(descriptor, Arc::new(NoopLlm), Arc::new(ToolRegistry::new()))
    }

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: "1".into(),
            name: name.into(),
            arguments,
        }
    }

    #[test]
    fn test_transfer_call_becomes_handoff() {
        let msg = agent().interpret(
            "",
            &[call("transfer_to_WriterAgent", json!({"message": "Fix the sources section"}))],
        );
        assert_eq!(msg.kind, MessageKind::Handoff);
        assert_eq!(msg.target.unwrap().as_str(), "WriterAgent");
        assert_eq!(msg.content, "Fix the sources section");
    }

    #[test]
    fn test_other_call_becomes_tool_call() {
        let msg = agent().interpret(
            "Reading the draft",
            &[
                call("read_file", json!({"file_path": "outputs/a.md"})),
                call("transfer_to_PlannerAgent", json!({})),
            ],
        );
        assert_eq!(msg.kind, MessageKind::ToolCall);
        assert_eq!(msg.tool_name.as_deref(), Some("read_file"));
        assert_eq!(msg.content, "Reading the draft");
    }

    #[test]
    fn test_text_mapping() {
        let a = agent();
        assert_eq!(a.interpret("All done. FINISHED", &[]).kind, MessageKind::Termination);

        let handoff = a.interpret("Looks good.\ntransfer_to_PlannerAgent", &[]);
        assert_eq!(handoff.kind, MessageKind::Handoff);
        assert_eq!(handoff.target.unwrap().as_str(), "PlannerAgent");

        assert_eq!(a.interpret("Still reviewing", &[]).kind, MessageKind::Text);
    }

    #[test]
    fn test_handoff_definitions_cover_targets() {
        let team = crate::agents::default_team();
        let defs = agent().with_roster(&team).handoff_definitions();
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["transfer_to_PlannerAgent", "transfer_to_WriterAgent"]);
        assert!(defs[0].description.contains("finalizes the report"));
    }

    #[test]
    fn test_conversation_keeps_task_and_recent_messages() {
        let mut transcript = Transcript::seeded("Research solar power");
        for i in 0..50 {
            transcript.push(Message::text("WriterAgent", format!("draft paragraph {} {}", i, "x".repeat(400))));
        }

        let a = agent().with_history_token_budget(500);
        let conversation = a.conversation(&transcript);

        assert_eq!(conversation[0], ("user".to_string(), "Research solar power".to_string()));
        assert!(conversation.len() < 51);
        assert!(conversation.last().unwrap().1.contains("draft paragraph 49"));
    }
}
