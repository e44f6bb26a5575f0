//! Provider Registry for managing multiple LLM providers
//!
//! Resolves the `model -> provider` chain declared in `research.toml` and
//! creates clients for it. Agents and the summarizer ask for clients by model
//! name; clients for the same model are shared.

use crate::llm::client::{LLMClient, Provider};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{ModelConfig, ProviderConfig, ResearchConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for managing multiple named LLM providers
pub struct ProviderRegistry {
    /// Provider configurations keyed by name
    providers: HashMap<String, ProviderConfig>,
    /// Model configurations keyed by name
    models: HashMap<String, ModelConfig>,
    /// Clients already created, keyed by model name
    clients: Mutex<HashMap<String, Arc<dyn LLMClient>>>,
}

impl ProviderRegistry {
    /// Create a new empty provider registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            models: HashMap::new(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Create a provider registry from TOML configuration
    pub fn from_config(config: &ResearchConfig) -> Self {
        Self {
            providers: config.providers.clone(),
            models: config.models.clone(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Register a provider configuration
    pub fn register_provider(&mut self, name: &str, config: ProviderConfig) {
        self.providers.insert(name.to_string(), config);
    }

    /// Register a model configuration
    pub fn register_model(&mut self, name: &str, config: ModelConfig) {
        self.models.insert(name.to_string(), config);
    }

    /// Install a ready-made client for a model name, bypassing configuration
    pub fn insert_client(&self, model_name: &str, client: Arc<dyn LLMClient>) {
        self.clients.lock().insert(model_name.to_string(), client);
    }

    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains_key(name) || self.clients.lock().contains_key(name)
    }

    /// Get all model names
    pub fn model_names(&self) -> Vec<&str> {
        self.models.keys().map(|s| s.as_str()).collect()
    }

    /// Resolve a model name into a provider with its secrets filled in
    pub fn provider_for_model(&self, model_name: &str) -> Result<Provider> {
        let model_config = self.get_model(model_name).ok_or_else(|| {
            AppError::Configuration(format!("Model '{}' not found in configuration", model_name))
        })?;

        let provider_config = self.get_provider(&model_config.provider).ok_or_else(|| {
            AppError::Configuration(format!(
                "Provider '{}' referenced by model '{}' not found",
                model_config.provider, model_name
            ))
        })?;

        Provider::from_model_config(model_config, provider_config)
    }

    /// Client for a model by name, created on first use
    pub async fn create_client_for_model(&self, model_name: &str) -> Result<Arc<dyn LLMClient>> {
        if let Some(client) = self.clients.lock().get(model_name) {
            return Ok(client.clone());
        }

        let provider = self.provider_for_model(model_name)?;
        let client: Arc<dyn LLMClient> = Arc::from(provider.create_client().await?);

        tracing::debug!(
            model = model_name,
            provider = provider.name(),
            model_id = provider.model(),
            "Created LLM client"
        );

        self.clients
            .lock()
            .entry(model_name.to_string())
            .or_insert_with(|| client.clone());
        Ok(client)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    /// Build a provider from a model entry and the provider it references.
    ///
    /// API keys are read from the environment variable the provider names.
    pub fn from_model_config(model: &ModelConfig, provider: &ProviderConfig) -> Result<Self> {
        match provider {
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                ..
            } => {
                let api_key = std::env::var(api_key_env).map_err(|_| {
                    AppError::Configuration(format!(
                        "Environment variable '{}' is not set",
                        api_key_env
                    ))
                })?;

                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.model.clone(),
                    temperature: model.temperature,
                    max_tokens: model.max_tokens,
                })
            }
            ProviderConfig::Ollama { base_url, .. } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.model.clone(),
                temperature: model.temperature,
            }),
        }
    }
}
