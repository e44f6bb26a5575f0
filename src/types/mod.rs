use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============= Agent Names =============

/// Unique, immutable name of an agent taking part in a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentName(String);

impl AgentName {
    /// Sender name used for the seeded task message
    pub const USER: &'static str = "user";
    /// Sender name used for notes the orchestrator itself appends
    pub const ORCHESTRATOR: &'static str = "orchestrator";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn user() -> Self {
        Self::new(Self::USER)
    }

    pub fn orchestrator() -> Self {
        Self::new(Self::ORCHESTRATOR)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AgentName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for AgentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============= Transcript Messages =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    ToolCall,
    ToolResult,
    Handoff,
    Termination,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::ToolCall => "tool_call",
            MessageKind::ToolResult => "tool_result",
            MessageKind::Handoff => "handoff",
            MessageKind::Termination => "termination",
        }
    }
}

/// A single entry of the shared transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: AgentName,
    pub kind: MessageKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<AgentName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<Value>,
}

impl Message {
    pub fn text(sender: impl Into<AgentName>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            kind: MessageKind::Text,
            content: content.into(),
            target: None,
            tool_name: None,
            tool_args: None,
        }
    }

    pub fn tool_call(sender: impl Into<AgentName>, tool_name: impl Into<String>, args: Value) -> Self {
        let tool_name = tool_name.into();
        Self {
            sender: sender.into(),
            kind: MessageKind::ToolCall,
            content: format!("calling {}", tool_name),
            target: None,
            tool_name: Some(tool_name),
            tool_args: Some(args),
        }
    }

    pub fn tool_result(
        sender: impl Into<AgentName>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            kind: MessageKind::ToolResult,
            content: content.into(),
            target: None,
            tool_name: Some(tool_name.into()),
            tool_args: None,
        }
    }

    pub fn handoff(
        sender: impl Into<AgentName>,
        target: impl Into<AgentName>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            kind: MessageKind::Handoff,
            content: content.into(),
            target: Some(target.into()),
            tool_name: None,
            tool_args: None,
        }
    }

    pub fn termination(sender: impl Into<AgentName>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            kind: MessageKind::Termination,
            content: content.into(),
            target: None,
            tool_name: None,
            tool_args: None,
        }
    }

    /// Attach free-form text to a message built by one of the other constructors
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

// ============= Tool Types =============

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Argument key holding tool-call arguments that were not valid JSON
pub const RAW_ARGUMENTS_KEY: &str = "_raw";

/// A function call requested by a language model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid arguments for tool '{tool_name}': {message}")]
    InvalidArgs { tool_name: String, message: String },

    #[error("{message}")]
    Tool { tool_name: String, message: String },

    #[error("agent '{agent}' is not allowed to use tool '{tool}'")]
    UnauthorizedTool { agent: String, tool: String },

    #[error("agent '{from}' may not hand off to '{to}'")]
    IllegalHandoff { from: String, to: String },

    #[error("round ceiling of {0} exceeded")]
    RoundCeilingExceeded(u32),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_args(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidArgs {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Render a tool-level failure the way it is recorded in the transcript.
    pub fn tool_result_text(&self) -> String {
        format!("Error: {}", self)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
