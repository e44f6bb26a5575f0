//! Tool dispatch through the registry: search results, timeouts and argument checks.

mod common;

use common::mocks::{numbered_hit, ScriptedAgent, SlowTool, StubSearchProvider};
use deep_research::agents::{AgentDescriptor, Role};
use deep_research::artifacts::{ArtifactKind, ArtifactStore, MemoryArtifactStore};
use deep_research::swarm::Swarm;
use deep_research::tools::search::SearchHit;
use deep_research::tools::{ReadFileTool, ToolRegistry, WebSearchTool, WriteFileTool};
use deep_research::types::{AgentName, Message, MessageKind};
use deep_research::RunContext;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn search_registry(provider: Arc<StubSearchProvider>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WebSearchTool::new(provider)));
    registry.register(Arc::new(ReadFileTool));
    registry
}

#[tokio::test]
async fn test_web_search_returns_bounded_results_and_raw_artifact() {
    let provider = Arc::new(StubSearchProvider::new(8));
    let registry = search_registry(provider.clone());
    let store = Arc::new(MemoryArtifactStore::new());
    let ctx = RunContext::new(store.clone());
    let caller = AgentName::new("SearchAgent");

    let outcome = registry
        .dispatch(
            "web_search",
            json!({"query": "sodium-ion grid storage", "max_results": 3}),
            ctx.for_tool(&caller),
        )
        .await;

    assert!(outcome.success, "dispatch failed: {}", outcome.content);
    assert!(outcome.deliverable.is_none());
    assert_eq!(
        provider.queries(),
        vec![("sodium-ion grid storage".to_string(), 3)]
    );

    let result: Value = serde_json::from_str(&outcome.content).unwrap();
    let results = result["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for (i, entry) in results.iter().enumerate() {
        assert_eq!(entry["title"], numbered_hit(i).title);
        assert_eq!(entry["url"], numbered_hit(i).url);
        let snippet = entry["snippet"].as_str().unwrap();
        assert!(!snippet.is_empty());
        assert!(snippet.split_whitespace().count() <= 50);
    }

    // The reference reads back the raw provider payload, cut to max_results
    let file_path = result["file_path"].as_str().unwrap();
    assert!(file_path.starts_with(ArtifactKind::SearchResult.dir()));
    let raw = store.read(file_path).await.unwrap();
    let hits: Vec<SearchHit> = serde_json::from_str(&raw).unwrap();
    assert_eq!(hits, (0..3).map(numbered_hit).collect::<Vec<_>>());

    // read_file resolves the same reference through dispatch
    let read_back = registry
        .dispatch(
            "read_file",
            json!({ "file_path": file_path }),
            ctx.for_tool(&caller),
        )
        .await;
    assert!(read_back.success);
    assert_eq!(read_back.content, raw);
}

#[tokio::test]
async fn test_web_search_defaults_to_five_results() {
    let provider = Arc::new(StubSearchProvider::new(12));
    let registry = search_registry(provider.clone());
    let ctx = RunContext::new(Arc::new(MemoryArtifactStore::new()));
    let caller = AgentName::new("SearchAgent");

    let outcome = registry
        .dispatch("web_search", json!({"query": "perovskite"}), ctx.for_tool(&caller))
        .await;

    let result: Value = serde_json::from_str(&outcome.content).unwrap();
    assert_eq!(result["results"].as_array().unwrap().len(), 5);
    assert_eq!(provider.queries()[0].1, 5);
}

#[tokio::test]
async fn test_schema_violations_become_error_results() {
    let registry = search_registry(Arc::new(StubSearchProvider::new(1)));
    let ctx = RunContext::new(Arc::new(MemoryArtifactStore::new()));
    let caller = AgentName::new("SearchAgent");

    let missing = registry
        .dispatch("web_search", json!({"max_results": 2}), ctx.for_tool(&caller))
        .await;
    assert!(!missing.success);
    assert!(missing
        .content
        .starts_with("Error: invalid arguments for tool 'web_search'"));

    let wrong_type = registry
        .dispatch(
            "web_search",
            json!({"query": "x", "max_results": "three"}),
            ctx.for_tool(&caller),
        )
        .await;
    assert!(!wrong_type.success);
    assert!(wrong_type.content.starts_with("Error:"));

    let unknown = registry
        .dispatch("translate", json!({}), ctx.for_tool(&caller))
        .await;
    assert!(!unknown.success);
    assert!(unknown.content.starts_with("Error:"));
}

#[tokio::test]
async fn test_write_file_reports_deliverable() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WriteFileTool));
    let store = Arc::new(MemoryArtifactStore::new());
    let ctx = RunContext::new(store.clone());
    let caller = AgentName::new("WriterAgent");

    let outcome = registry
        .dispatch(
            "write_file",
            json!({"content": "# Findings\n\nSodium is cheap."}),
            ctx.for_tool(&caller),
        )
        .await;

    let deliverable = outcome.deliverable.expect("write_file produces a deliverable");
    assert!(deliverable.as_str().starts_with("outputs/"));
    assert_eq!(
        store.read(deliverable.as_str()).await.unwrap(),
        "# Findings\n\nSodium is cheap."
    );
    assert_eq!(store.list(ArtifactKind::Output).len(), 1);
}

#[tokio::test]
async fn test_tool_timeout_is_an_error_result() {
    let mut registry = ToolRegistry::new();
    registry.register_with_timeout(
        Arc::new(SlowTool {
            delay: Duration::from_secs(30),
        }),
        Duration::from_millis(50),
    );
    let ctx = RunContext::new(Arc::new(MemoryArtifactStore::new()));
    let caller = AgentName::new("SearchAgent");

    let outcome = registry
        .dispatch("slow_tool", json!({}), ctx.for_tool(&caller))
        .await;

    assert!(!outcome.success);
    assert!(outcome.content.starts_with("Error:"));
    assert!(outcome.content.contains("timed out"));
}

#[tokio::test]
async fn test_timed_out_tool_does_not_abort_the_run() {
    let mut registry = ToolRegistry::new();
    registry.register_with_timeout(
        Arc::new(SlowTool {
            delay: Duration::from_secs(30),
        }),
        Duration::from_millis(50),
    );
    registry.register(Arc::new(WriteFileTool));

    let agent = AgentDescriptor::new("SearchAgent", Role::Searcher)
        .with_tools(["slow_tool", "write_file"]);
    let swarm = Swarm::builder()
        .agent(Arc::new(ScriptedAgent::new(
            agent,
            vec![
                Message::tool_call("SearchAgent", "slow_tool", json!({})),
                Message::tool_call("SearchAgent", "write_file", json!({"content": "partial"})),
                Message::termination("SearchAgent", "Wrote what I had. FINISHED"),
            ],
        )))
        .tools(Arc::new(registry))
        .build()
        .unwrap();

    let outcome = swarm
        .run("task", &RunContext::new(Arc::new(MemoryArtifactStore::new())))
        .await;

    assert!(outcome.is_done());
    let results: Vec<&Message> = outcome
        .transcript
        .iter()
        .filter(|m| m.kind == MessageKind::ToolResult)
        .collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].content.starts_with("Error:"));
    assert!(results[1].content.contains("outputs/"));
    assert_eq!(outcome.deliverables.len(), 1);
    assert_eq!(outcome.final_artifact.as_ref(), outcome.deliverables.first());
}
