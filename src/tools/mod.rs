//! Tool Dispatch Layer
//!
//! Tools are named capabilities an agent invokes explicitly by name. The
//! orchestrator never chooses tools itself; it checks the calling agent's
//! permission and hands the call to the [`ToolRegistry`], which:
//!
//! 1. looks the tool up by name,
//! 2. checks the arguments against the tool's declared JSON schema,
//! 3. runs the tool under its configured timeout,
//! 4. converts every failure into a `ToolResult` text starting with `Error:`.
//!
//! # Module Structure
//!
//! - [`registry`](crate::tools::registry) - Registration, schema checking and dispatch
//! - [`schema`](crate::tools::schema) - Minimal JSON-schema argument validation
//! - [`search`](crate::tools::search) - `web_search` over a pluggable search provider
//! - [`scrape`](crate::tools::scrape) - `web_scrape` with article and HTML extraction strategies
//! - [`files`](crate::tools::files) - `read_file` and `write_file` over the artifact store
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ToolRegistry::new();
//! registry.register(Arc::new(ReadFileTool));
//!
//! let outcome = registry
//!     .dispatch("read_file", json!({"file_path": id}), ctx.for_tool(&caller))
//!     .await;
//! assert!(outcome.success);
//! ```

/// File tools backed by the artifact store.
pub mod files;
/// Tool registry and dispatch.
pub mod registry;
/// JSON-schema checks for tool arguments.
pub mod schema;
/// Web scraping tool.
pub mod scrape;
/// Web search tool using DuckDuckGo.
pub mod search;

pub use files::{ReadFileTool, WriteFileTool};
pub use registry::{DispatchOutcome, Tool, ToolRegistry, DEFAULT_TOOL_TIMEOUT};
pub use scrape::{ScrapeStrategy, WebScrapeTool};
pub use search::{SearchHit, SearchProvider, SearchResults, WebSearchTool};

/// Names of the tools this crate ships
pub const BUILTIN_TOOLS: [&str; 4] = ["web_search", "web_scrape", "read_file", "write_file"];

/// Whether `name` is one of [`BUILTIN_TOOLS`]
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_TOOLS.contains(&name)
}
