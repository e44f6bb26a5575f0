//! Web search tool
//!
//! `web_search` asks a [`SearchProvider`] for hits, persists the raw provider
//! payload as a `search_results` artifact and returns short snippets plus the
//! artifact reference. The production provider uses the daedra crate, which
//! queries DuckDuckGo.

use crate::artifacts::ArtifactKind;
use crate::context::ToolContext;
use crate::summarize::{truncate_words, NO_CONTENT_SENTINEL};
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Results returned when the caller does not ask for a specific count
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Upper bound on `max_results`
pub const MAX_RESULTS_LIMIT: usize = 20;

/// Words kept per snippet unless configured otherwise
pub const DEFAULT_SNIPPET_TOKENS: usize = 50;

/// One search provider hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Provider-supplied description of the page
    pub body: String,
}

/// Hits of one search together with the provider's own payload
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    /// Provider result list as returned, one entry per hit
    pub raw: Vec<Value>,
}

impl SearchResults {
    /// Results whose raw payload is the serialized hits themselves
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        let raw = hits
            .iter()
            .map(|h| json!({ "title": h.title, "url": h.url, "body": h.body }))
            .collect();
        Self { hits, raw }
    }

    pub fn truncate(&mut self, len: usize) {
        self.hits.truncate(len);
        self.raw.truncate(len);
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Up to `max_results` hits for `query`, best first
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResults>;
}

/// DuckDuckGo search powered by daedra
#[derive(Default)]
pub struct DaedraSearchProvider;

impl DaedraSearchProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchProvider for DaedraSearchProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResults> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::tool("web_search", e.to_string()))?;

        let raw = response
            .data
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let hits = response
            .data
            .iter()
            .map(|r| SearchHit {
                title: r.title.clone(),
                url: r.url.clone(),
                body: r.description.clone(),
            })
            .collect();

        Ok(SearchResults { hits, raw })
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

/// `web_search(query, max_results)` tool
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
    snippet_tokens: usize,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            snippet_tokens: DEFAULT_SNIPPET_TOKENS,
        }
    }

    pub fn with_snippet_tokens(mut self, snippet_tokens: usize) -> Self {
        self.snippet_tokens = snippet_tokens;
        self
    }

    async fn snippet(&self, hit: &SearchHit, ctx: &ToolContext<'_>) -> String {
        let summarizer = ctx.summarizer();
        let (digest, _) = summarizer
            .digest(summarizer.mode(), &hit.body, self.snippet_tokens)
            .await;

        if digest == NO_CONTENT_SENTINEL {
            truncate_words(&hit.title, self.snippet_tokens)
        } else {
            digest
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo. Returns up to max_results hits as {title, snippet, url} \
         plus file_path, a reference to the full raw results readable with read_file."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5)",
                    "minimum": 1,
                    "maximum": MAX_RESULTS_LIMIT
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, ctx: ToolContext<'_>) -> Result<Value> {
        let args: SearchArgs = serde_json::from_value(args)
            .map_err(|e| AppError::invalid_args(self.name(), e.to_string()))?;
        let max_results = args
            .max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_LIMIT);

        let mut found = match self.provider.search(&args.query, max_results).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(query = %args.query, error = %e, "Search provider failed");
                return Ok(json!({ "error": format!("Search failed: {}", e) }));
            }
        };
        found.truncate(max_results);
        let hits = &found.hits;

        let raw = serde_json::to_string_pretty(&found.raw)?;
        let artifact = ctx
            .artifacts()
            .write(ArtifactKind::SearchResult, &raw, self.name())
            .await?;

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            results.push(json!({
                "title": hit.title,
                "snippet": self.snippet(hit, &ctx).await,
                "url": hit.url,
            }));
        }

        tracing::info!(
            query = %args.query,
            results = results.len(),
            artifact = %artifact.id,
            "Web search completed"
        );

        Ok(json!({
            "results": results,
            "file_path": artifact.id,
        }))
    }
}
