//! TOML-based configuration for deep-research
//!
//! Providers, models, the swarm, tools and agents are declared in a TOML file
//! (`research.toml`). Secrets are never stored in the file: providers name
//! the environment variable holding their key, and `.env` is loaded at
//! startup.
//!
//! When no `[agents]` table is present the built-in four-role research team
//! is used, all of them on the model named `default`.

use crate::agents::{default_team, AgentDescriptor, MemoryView, Role};
use crate::summarize::SummaryMode;
use crate::swarm::{DEFAULT_MAX_REVISIONS, DEFAULT_MAX_ROUNDS, DEFAULT_TERMINATION_TOKEN};
use crate::tools::{is_builtin, BUILTIN_TOOLS};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Model name used by agents and the summarizer unless configured otherwise
pub const DEFAULT_MODEL: &str = "default";

/// Root configuration structure loaded from research.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Named LLM provider configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Named model configurations that reference providers
    #[serde(default)]
    pub models: HashMap<String, ModelConfig>,

    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    #[serde(default)]
    pub summarizer: SummarizerConfig,

    #[serde(default)]
    pub swarm: SwarmConfig,

    /// Per-tool switches and timeouts, keyed by tool name
    #[serde(default)]
    pub tools: HashMap<String, ToolConfig>,

    /// Agent configurations; empty means the default research team
    #[serde(default)]
    pub agents: BTreeMap<String, AgentConfig>,
}

// ============= Runtime Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        default_model: String,
    },
    /// Any OpenAI-compatible chat completions endpoint
    OpenAI {
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        default_model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

// ============= Model Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Reference to a provider name defined in [providers]
    pub provider: String,

    /// Model name/identifier to use with the provider
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_model_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_model_max_tokens() -> u32 {
    2048
}

// ============= Artifacts & Summarizer =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding the artifact namespaces
    #[serde(default = "default_artifact_root")]
    pub root: PathBuf,
}

fn default_artifact_root() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            root: default_artifact_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default)]
    pub mode: SummaryMode,

    /// Model used for delegated condensation
    #[serde(default = "default_model_name")]
    pub model: String,

    /// Words per search-hit snippet
    #[serde(default = "default_snippet_tokens")]
    pub snippet_tokens: usize,

    /// Default web_scrape digest length in words
    #[serde(default = "default_scrape_tokens")]
    pub scrape_tokens: usize,
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_snippet_tokens() -> usize {
    50
}

fn default_scrape_tokens() -> usize {
    300
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            mode: SummaryMode::default(),
            model: default_model_name(),
            snippet_tokens: default_snippet_tokens(),
            scrape_tokens: default_scrape_tokens(),
        }
    }
}

// ============= Swarm Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmConfig {
    #[serde(default = "default_entry_agent")]
    pub entry_agent: String,

    /// Terminal-adjacent agent the revision guard redirects to; defaults to the entry agent
    #[serde(default)]
    pub finalizer: Option<String>,

    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    #[serde(default = "default_max_revisions")]
    pub max_revisions: u32,

    #[serde(default = "default_termination_token")]
    pub termination_token: String,
}

fn default_entry_agent() -> String {
    crate::agents::roles::PLANNER.to_string()
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

fn default_max_revisions() -> u32 {
    DEFAULT_MAX_REVISIONS
}

fn default_termination_token() -> String {
    DEFAULT_TERMINATION_TOKEN.to_string()
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            entry_agent: default_entry_agent(),
            finalizer: None,
            max_rounds: default_max_rounds(),
            max_revisions: default_max_revisions(),
            termination_token: default_termination_token(),
        }
    }
}

// ============= Tool Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_tool_timeout() -> u64 {
    30
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_tool_timeout(),
        }
    }
}

// ============= Agent Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_role")]
    pub role: Role,

    /// Reference to a model name defined in [models]
    #[serde(default = "default_model_name")]
    pub model: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Behavioural instructions; the role's built-in prompt when omitted
    #[serde(default)]
    pub system_prompt: Option<String>,

    #[serde(default)]
    pub tools: Vec<String>,

    #[serde(default)]
    pub handoffs: Vec<String>,

    #[serde(default)]
    pub memory: Option<MemoryView>,
}

fn default_role() -> Role {
    Role::Custom
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Provider '{0}' referenced by model '{1}' does not exist")]
    MissingProvider(String, String),

    #[error("Model '{0}' referenced by '{1}' does not exist")]
    MissingModel(String, String),

    #[error("Agent '{0}' referenced by '{1}' does not exist")]
    MissingAgent(String, String),

    #[error("Tool '{0}' referenced by agent '{1}' does not exist")]
    MissingTool(String, String),
}

impl From<ConfigError> for crate::types::AppError {
    fn from(err: ConfigError) -> Self {
        crate::types::AppError::Configuration(err.to_string())
    }
}

impl ResearchConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file without validating it
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ResearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Provider env vars
        for provider in self.providers.values() {
            if let ProviderConfig::OpenAI { api_key_env, .. } = provider {
                self.validate_env_var(api_key_env)?;
            }
        }

        // Model -> provider references
        for (model_name, model_config) in &self.models {
            if !self.providers.contains_key(&model_config.provider) {
                return Err(ConfigError::MissingProvider(
                    model_config.provider.clone(),
                    model_name.clone(),
                ));
            }
        }

        if self.summarizer.mode == SummaryMode::Abstractive
            && !self.models.contains_key(&self.summarizer.model)
        {
            return Err(ConfigError::MissingModel(
                self.summarizer.model.clone(),
                "summarizer".to_string(),
            ));
        }

        for (tool_name, tool_config) in &self.tools {
            if !is_builtin(tool_name) {
                return Err(ConfigError::ValidationError(format!(
                    "unknown tool section [tools.{}]; available tools: {}",
                    tool_name,
                    BUILTIN_TOOLS.join(", ")
                )));
            }
            if tool_config.timeout_secs == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "tool '{}' needs a timeout of at least 1 second",
                    tool_name
                )));
            }
        }

        let descriptors = self.agent_descriptors();
        let names: HashSet<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();

        // Agent -> model, tools and handoff targets
        for descriptor in &descriptors {
            let agent = descriptor.name.as_str();
            let model = self.agent_model(agent);
            if !self.models.contains_key(model) {
                return Err(ConfigError::MissingModel(model.to_string(), agent.to_string()));
            }

            for tool_name in &descriptor.tool_names {
                if !is_builtin(tool_name) {
                    return Err(ConfigError::MissingTool(tool_name.clone(), agent.to_string()));
                }
                if !self.tool_enabled(tool_name) {
                    return Err(ConfigError::ValidationError(format!(
                        "tool '{}' used by agent '{}' is disabled",
                        tool_name, agent
                    )));
                }
            }

            for target in &descriptor.handoff_targets {
                if !names.contains(target.as_str()) {
                    return Err(ConfigError::MissingAgent(target.to_string(), agent.to_string()));
                }
            }
        }

        if !names.contains(self.swarm.entry_agent.as_str()) {
            return Err(ConfigError::MissingAgent(
                self.swarm.entry_agent.clone(),
                "swarm.entry_agent".to_string(),
            ));
        }

        let finalizer = self.finalizer();
        if !names.contains(finalizer) {
            return Err(ConfigError::MissingAgent(
                finalizer.to_string(),
                "swarm.finalizer".to_string(),
            ));
        }

        for descriptor in descriptors.iter().filter(|d| d.is_reviewer()) {
            if !descriptor.handoff_targets.iter().any(|t| t.as_str() == finalizer) {
                return Err(ConfigError::ValidationError(format!(
                    "reviewer '{}' must list the finalizer '{}' among its handoffs",
                    descriptor.name, finalizer
                )));
            }
        }

        if self.swarm.max_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "swarm.max_rounds must be at least 1".to_string(),
            ));
        }

        if self.swarm.termination_token.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "swarm.termination_token must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get provider by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Get model by name
    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    /// Get agent config by name
    pub fn get_agent(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.get(name)
    }

    pub fn tool_enabled(&self, name: &str) -> bool {
        self.tools.get(name).map(|t| t.enabled).unwrap_or(true)
    }

    pub fn tool_timeout(&self, name: &str) -> Duration {
        let secs = self
            .tools
            .get(name)
            .map(|t| t.timeout_secs)
            .unwrap_or_else(default_tool_timeout);
        Duration::from_secs(secs)
    }

    /// Built-in tools that are switched on
    pub fn enabled_tools(&self) -> Vec<&'static str> {
        BUILTIN_TOOLS
            .iter()
            .copied()
            .filter(|name| self.tool_enabled(name))
            .collect()
    }

    /// Model name an agent runs on
    pub fn agent_model(&self, agent_name: &str) -> &str {
        self.get_agent(agent_name)
            .map(|a| a.model.as_str())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn finalizer(&self) -> &str {
        self.swarm
            .finalizer
            .as_deref()
            .unwrap_or(self.swarm.entry_agent.as_str())
    }

    /// Descriptors of the configured agents, or of the default team when none are configured
    pub fn agent_descriptors(&self) -> Vec<AgentDescriptor> {
        if self.agents.is_empty() {
            return default_team();
        }

        self.agents
            .iter()
            .map(|(name, config)| {
                let mut descriptor = AgentDescriptor::new(name.as_str(), config.role)
                    .with_tools(config.tools.iter().cloned())
                    .with_handoffs(config.handoffs.iter().map(String::as_str));

                if let Some(description) = &config.description {
                    descriptor = descriptor.with_description(description.clone());
                }
                if let Some(prompt) = &config.system_prompt {
                    descriptor = descriptor.with_instructions(prompt.clone());
                }
                if let Some(view) = config.memory {
                    descriptor = descriptor.with_memory(view.limit);
                }
                descriptor
            })
            .collect()
    }

    /// Whether any agent reads shared memory
    pub fn uses_memory(&self) -> bool {
        self.agents.values().any(|a| a.memory.is_some())
    }
}
