use crate::artifacts::ArtifactId;
use crate::context::ToolContext;
use crate::tools::files::{ReadFileTool, WriteFileTool};
use crate::tools::schema::validate_args;
use crate::tools::scrape::WebScrapeTool;
use crate::tools::search::{DaedraSearchProvider, WebSearchTool};
use crate::types::{AppError, Result, ToolDefinition, RAW_ARGUMENTS_KEY};
use crate::utils::toml_config::ResearchConfig;
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Timeout applied to tools registered without an explicit one
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;

    /// Tools whose result carries a `file_path` naming a final deliverable
    fn produces_deliverable(&self) -> bool {
        false
    }

    async fn execute(&self, args: Value, ctx: ToolContext<'_>) -> Result<Value>;
}

struct RegisteredTool {
    tool: Arc<dyn Tool>,
    timeout: Duration,
}

/// What the orchestrator appends to the transcript after a tool call
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// Result text; failures start with `Error:`
    pub content: String,
    pub success: bool,
    /// Artifact written by a deliverable-producing tool
    pub deliverable: Option<ArtifactId>,
}

pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.register_with_timeout(tool, DEFAULT_TOOL_TIMEOUT);
    }

    pub fn register_with_timeout(&mut self, tool: Arc<dyn Tool>, timeout: Duration) {
        self.tools
            .insert(tool.name().to_string(), RegisteredTool { tool, timeout });
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut names = self.tool_names();
        names.sort();
        self.get_tool_definitions_for(names.iter().map(String::as_str))
    }

    /// Definitions of the named tools, in the order given. Unknown names are skipped.
    pub fn get_tool_definitions_for<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Vec<ToolDefinition> {
        names
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|entry| ToolDefinition {
                name: entry.tool.name().to_string(),
                description: entry.tool.description().to_string(),
                parameters: entry.tool.parameters_schema(),
            })
            .collect()
    }

    /// Validate and run a tool, propagating every failure as an error.
    ///
    /// Fails with `NotFound` for unknown tools, `InvalidArgs` when the
    /// arguments do not match the declared schema and `Tool` on timeout or
    /// panic. Errors returned by the tool itself pass through unchanged.
    pub async fn invoke(&self, name: &str, args: Value, ctx: ToolContext<'_>) -> Result<Value> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| AppError::NotFound(format!("tool '{}'", name)))?;

        if let Some(raw) = args.get(RAW_ARGUMENTS_KEY).and_then(Value::as_str) {
            return Err(AppError::invalid_args(
                name,
                format!("arguments are not valid JSON: {}", raw),
            ));
        }
        validate_args(&entry.tool.parameters_schema(), &args)
            .map_err(|message| AppError::invalid_args(name, message))?;

        let call = AssertUnwindSafe(entry.tool.execute(args, ctx)).catch_unwind();

        match tokio::time::timeout(entry.timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(AppError::tool(
                name,
                format!("Tool '{}' panicked during execution.", name),
            )),
            Err(_) => Err(AppError::tool(
                name,
                format!(
                    "Tool '{}' timed out after {} seconds.",
                    name,
                    entry.timeout.as_secs()
                ),
            )),
        }
    }

    /// Run a tool and render the outcome as transcript content. Never fails.
    pub async fn dispatch(&self, name: &str, args: Value, ctx: ToolContext<'_>) -> DispatchOutcome {
        let caller = ctx.caller.clone();

        match self.invoke(name, args, ctx).await {
            Ok(value) => {
                let deliverable = self
                    .tools
                    .get(name)
                    .filter(|entry| entry.tool.produces_deliverable())
                    .and_then(|_| value.get("file_path"))
                    .and_then(|p| p.as_str())
                    .map(ArtifactId::new);

                tracing::debug!(tool = name, agent = %caller, "Tool call succeeded");

                DispatchOutcome {
                    content: render_value(&value),
                    success: true,
                    deliverable,
                }
            }
            Err(e) => {
                tracing::warn!(tool = name, agent = %caller, error = %e, "Tool call failed");

                DispatchOutcome {
                    content: e.tool_result_text(),
                    success: false,
                    deliverable: None,
                }
            }
        }
    }

    /// Get a list of all registered tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn timeout_for(&self, name: &str) -> Option<Duration> {
        self.tools.get(name).map(|entry| entry.timeout)
    }

    /// Registry of the enabled built-in tools with their configured timeouts
    pub fn with_config(config: &ResearchConfig) -> Result<Self> {
        let mut registry = Self::new();

        for name in config.enabled_tools() {
            let tool: Arc<dyn Tool> = match name {
                "web_search" => Arc::new(
                    WebSearchTool::new(Arc::new(DaedraSearchProvider::new()))
                        .with_snippet_tokens(config.summarizer.snippet_tokens),
                ),
                "web_scrape" => Arc::new(
                    WebScrapeTool::new()?.with_default_tokens(config.summarizer.scrape_tokens),
                ),
                "read_file" => Arc::new(ReadFileTool),
                "write_file" => Arc::new(WriteFileTool),
                other => {
                    return Err(AppError::Configuration(format!(
                        "no implementation for tool '{}'",
                        other
                    )))
                }
            };
            registry.register_with_timeout(tool, config.tool_timeout(name));
        }

        Ok(registry)
    }
}

/// Plain strings are appended verbatim, everything else as compact JSON
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
