//! LLM Client abstractions and provider selection
//!
//! Every agent talks to its model through [`LLMClient`]. Two HTTP providers
//! are implemented:
//! - **OpenAI**: any OpenAI-compatible `/chat/completions` endpoint (OpenAI,
//!   GitHub Models, OpenRouter, vLLM)
//! - **Ollama**: local inference through `/api/chat`

use crate::types::{AppError, Result, ToolCall, ToolDefinition, RAW_ARGUMENTS_KEY};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing agent code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate over a conversation with function calling enabled
    async fn generate_with_tools(
        &self,
        messages: &[(String, String)],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Response from an LLM generation request
#[derive(Debug, Clone, Default)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
}

impl LLMResponse {
    /// Plain text response without tool calls
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            finish_reason: "stop".to_string(),
        }
    }
}

/// Decode tool-call arguments that a provider sent as a JSON string.
///
/// Undecodable text is kept under [`RAW_ARGUMENTS_KEY`] so dispatch can
/// report it instead of a missing field.
pub(crate) fn parse_tool_arguments(tool: &str, raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(tool = %tool, error = %e, arguments = %raw, "Tool call arguments are not valid JSON");
            json!({ RAW_ARGUMENTS_KEY: raw })
        }
    }
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI-compatible API provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "ghp_...".to_string(),
    ///     api_base: "https://models.github.ai/inference".to_string(),
    ///     model: "openai/gpt-4o".to_string(),
    ///     temperature: 0.7,
    ///     max_tokens: 2048,
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        temperature: f32,
        max_tokens: u32,
    },

    /// Ollama local LLM provider
    ///
    /// Tool calling requires a model that supports it (e.g. `llama3.1`,
    /// `qwen2.5`, `mistral-nemo`). Agents fall back to textual handoff
    /// directives for models that do not.
    Ollama {
        base_url: String,
        model: String,
        temperature: f32,
    },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's cargo feature is disabled or the
    /// HTTP client cannot be built.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                temperature,
                max_tokens,
            } => Ok(Box::new(
                super::openai::OpenAIClient::new(api_key.clone(), api_base.clone(), model.clone())?
                    .with_temperature(*temperature)
                    .with_max_tokens(*max_tokens),
            )),

            #[cfg(feature = "ollama")]
            Provider::Ollama {
                base_url,
                model,
                temperature,
            } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone())?
                    .with_temperature(*temperature),
            )),

            #[allow(unreachable_patterns)]
            other => Err(AppError::Configuration(format!(
                "{} provider support is not compiled in; enable the '{}' feature",
                other.name(),
                other.name().to_lowercase()
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Model identifier sent to the provider
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}
