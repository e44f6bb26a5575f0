//! # deep-research
//!
//! A handoff-routed multi-agent research swarm. A small team of agents
//! (planner, searcher, writer, critic) shares one transcript; exactly one of
//! them holds the turn at a time and passes it on with explicit handoffs
//! until one emits the termination token.
//!
//! Large content never enters the conversation directly: tools persist full
//! search results, scraped pages and reports in an [`artifacts`] store and
//! return bounded digests plus a reference that agents can read back.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use deep_research::{
//!     AgentRegistry, FsArtifactStore, ProviderRegistry, ResearchConfig, RunContext, ToolRegistry,
//! };
//! use std::sync::Arc;
//!
//! let config = ResearchConfig::load("research.toml")?;
//! let providers = Arc::new(ProviderRegistry::from_config(&config));
//! let tools = Arc::new(ToolRegistry::with_config(&config)?);
//! let swarm = AgentRegistry::from_config(&config, providers, tools)
//!     .build_swarm()
//!     .await?;
//!
//! let ctx = RunContext::new(Arc::new(FsArtifactStore::new(&config.artifacts.root)));
//! let outcome = swarm.run("Survey recent work on sodium-ion batteries", &ctx).await;
//! println!("{}", outcome.status_line());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI-compatible endpoints (default) |
//!
//! ## Modules
//!
//! - [`swarm`] - The handoff-routing orchestrator
//! - [`agents`] - Agent roles, descriptors and the LLM-backed agent
//! - [`tools`] - Tool registry, dispatch and the built-in tools
//! - [`summarize`] - Bounded summarization
//! - [`artifacts`] - Write-once artifact storage
//! - [`memory`] - Optional shared memory across runs
//! - [`llm`] - LLM client implementations
//! - [`types`] - Messages, common types and error handling

/// Agent roles, descriptors and implementations.
pub mod agents;
/// Write-once artifact storage.
pub mod artifacts;
/// Command-line interface definitions and output helpers.
pub mod cli;
/// Per-run context threaded through agents and tools.
pub mod context;
/// LLM provider clients and abstractions.
pub mod llm;
/// Shared memory of transcript fragments.
pub mod memory;
/// Bounded summarization of large content.
pub mod summarize;
/// Handoff-routing orchestrator.
pub mod swarm;
/// Built-in tools and the dispatch layer.
pub mod tools;
/// Core types (messages, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{Agent, AgentDescriptor, AgentRegistry, LlmAgent, Role};
pub use artifacts::{ArtifactId, ArtifactKind, ArtifactStore, FsArtifactStore, MemoryArtifactStore};
pub use context::{RunContext, ToolContext};
pub use llm::{LLMClient, LLMResponse, Provider, ProviderRegistry};
pub use memory::{InMemoryStore, JsonlMemoryStore, SharedMemory};
pub use summarize::{BoundedSummarizer, Summary, SummaryMode};
pub use swarm::{AbortReason, RunOutcome, RunState, Swarm, SwarmBuilder, Transcript};
pub use tools::registry::ToolRegistry;
pub use types::{AgentName, AppError, Message, MessageKind, Result};
pub use utils::toml_config::{ConfigError, ResearchConfig};
