use crate::artifacts::ArtifactKind;
use crate::context::ToolContext;
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct ReadFileArgs {
    file_path: String,
}

/// Read back any artifact (search results, scraped text, drafts) by its path
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the full content of a file previously returned as file_path by another tool."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path exactly as returned by web_search, web_scrape or write_file"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: Value, ctx: ToolContext<'_>) -> Result<Value> {
        let args: ReadFileArgs = serde_json::from_value(args)
            .map_err(|e| AppError::invalid_args(self.name(), e.to_string()))?;

        let content = ctx.artifacts().read(&args.file_path).await?;
        Ok(Value::String(content))
    }
}

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    content: String,
}

/// Persist a deliverable into the `outputs` namespace
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Save a document (for example the markdown report) and return its new file_path."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "Full document text"
                }
            },
            "required": ["content"]
        })
    }

    fn produces_deliverable(&self) -> bool {
        true
    }

    async fn execute(&self, args: Value, ctx: ToolContext<'_>) -> Result<Value> {
        let args: WriteFileArgs = serde_json::from_value(args)
            .map_err(|e| AppError::invalid_args(self.name(), e.to_string()))?;

        let artifact = ctx
            .artifacts()
            .write(ArtifactKind::Output, &args.content, ctx.caller.as_str())
            .await?;

        tracing::info!(
            agent = %ctx.caller,
            artifact = %artifact.id,
            bytes = artifact.size_bytes,
            "Deliverable written"
        );

        Ok(json!({ "file_path": artifact.id }))
    }
}
