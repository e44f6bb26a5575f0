//! LLM Provider Clients and Abstractions
//!
//! Agents and the abstractive summarizer talk to language models only through
//! the [`LLMClient`] trait. Concrete clients speak HTTP with `reqwest`:
//!
//! - `openai` - any OpenAI-compatible chat completions endpoint (OpenAI,
//!   GitHub Models, OpenRouter, Azure)
//! - `ollama` - a local Ollama server
//!
//! [`ProviderRegistry`] resolves model names from `research.toml` into clients.
//!
//! # Example
//!
//! ```ignore
//! let registry = ProviderRegistry::from_config(&config);
//! let client = registry.create_client_for_model("default").await?;
//! let reply = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Registry resolving configured models into clients.
pub mod provider_registry;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, LLMResponse, Provider};
pub use provider_registry::ProviderRegistry;
