//! Agent Registry
//!
//! Turns the agent section of `research.toml` (or the default team) into
//! [`LlmAgent`] instances and assembles them into a [`Swarm`].

use crate::agents::{Agent, AgentDescriptor, LlmAgent};
use crate::llm::ProviderRegistry;
use crate::swarm::Swarm;
use crate::tools::registry::ToolRegistry;
use crate::types::{AgentName, AppError, Result};
use crate::utils::toml_config::ResearchConfig;
use std::collections::HashMap;
use std::sync::Arc;

pub struct AgentRegistry {
    descriptors: Vec<AgentDescriptor>,
    /// Model name per agent
    models: HashMap<AgentName, String>,
    provider_registry: Arc<ProviderRegistry>,
    tool_registry: Arc<ToolRegistry>,
    entry: AgentName,
    finalizer: AgentName,
    max_rounds: u32,
    max_revisions: u32,
    termination_token: String,
}

impl AgentRegistry {
    pub fn from_config(
        config: &ResearchConfig,
        provider_registry: Arc<ProviderRegistry>,
        tool_registry: Arc<ToolRegistry>,
    ) -> Self {
        let descriptors = config.agent_descriptors();
        let models = descriptors
            .iter()
            .map(|d| (d.name.clone(), config.agent_model(d.name.as_str()).to_string()))
            .collect();

        Self {
            descriptors,
            models,
            provider_registry,
            tool_registry,
            entry: AgentName::new(config.swarm.entry_agent.as_str()),
            finalizer: AgentName::new(config.finalizer()),
            max_rounds: config.swarm.max_rounds,
            max_revisions: config.swarm.max_revisions,
            termination_token: config.swarm.termination_token.clone(),
        }
    }

    pub fn descriptors(&self) -> &[AgentDescriptor] {
        &self.descriptors
    }

    pub fn agent_names(&self) -> Vec<&AgentName> {
        self.descriptors.iter().map(|d| &d.name).collect()
    }

    pub fn has_agent(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name.as_str() == name)
    }

    pub fn get_agent_model(&self, name: &AgentName) -> Option<&str> {
        self.models.get(name).map(String::as_str)
    }

    /// Create the agent with the given name
    pub async fn create_agent(&self, name: &str) -> Result<LlmAgent> {
        let descriptor = self
            .descriptors
            .iter()
            .find(|d| d.name.as_str() == name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("agent '{}'", name)))?;

        let model = self.get_agent_model(&descriptor.name).ok_or_else(|| {
            AppError::Configuration(format!("agent '{}' has no model", name))
        })?;
        let llm = self.provider_registry.create_client_for_model(model).await?;
        let may_finish = descriptor.name == self.finalizer || descriptor.name == self.entry;

        Ok(LlmAgent::new(descriptor, llm, self.tool_registry.clone())
            .with_roster(&self.descriptors)
            .with_termination_token(self.termination_token.clone(), may_finish))
    }

    /// Create every agent and wire them into a swarm
    pub async fn build_swarm(&self) -> Result<Swarm> {
        let mut builder = Swarm::builder()
            .tools(self.tool_registry.clone())
            .entry(self.entry.clone())
            .finalizer(self.finalizer.clone())
            .max_rounds(self.max_rounds)
            .max_revisions(self.max_revisions)
            .termination_token(self.termination_token.clone());

        for descriptor in &self.descriptors {
            let agent: Arc<dyn Agent> = Arc::new(self.create_agent(descriptor.name.as_str()).await?);
            builder = builder.agent(agent);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LLMClient, LLMResponse};
    use crate::types::ToolDefinition;
    use async_trait::async_trait;

    struct StaticLlm;

    #[async_trait]
    impl LLMClient for StaticLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok("ok".into())
        }

        async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
            Ok("ok".into())
        }


        async fn generate_with_tools(
            &self,
            _messages: &[(String, String)],
            _tools: &[ToolDefinition],
        ) -> Result<LLMResponse> {
            Ok(LLMResponse::text("ok"))
        }

        fn model_name(&self) -> &str {
            "static"
        }
    }

    fn registry() -> AgentRegistry {
        let config = ResearchConfig::default();
        let providers = ProviderRegistry::new();
        providers.insert_client("default", Arc::new(StaticLlm));

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(crate::tools::ReadFileTool));
        tools.register(Arc::new(crate::tools::WriteFileTool));
        tools.register(Arc::new(crate::tools::WebScrapeTool::with_extractors(
            Arc::new(NoExtract),
            Arc::new(NoExtract),
        )));
        tools.register(Arc::new(crate::tools::WebSearchTool::new(Arc::new(
            crate::tools::search::MockSearchProvider::new(),
        ))));

        AgentRegistry::from_config(&config, Arc::new(providers), Arc::new(tools))
    }

    struct NoExtract;

    #[async_trait]
    impl crate::tools::scrape::ContentExtractor for NoExtract {
        async fn extract(&self, _url: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_default_team_builds_a_swarm() {
        let registry = registry();
        assert!(registry.has_agent("CriticAgent"));
        assert_eq!(
            registry.get_agent_model(&AgentName::new("WriterAgent")),
            Some("default")
        );

        let swarm = registry.build_swarm().await.unwrap();
        assert_eq!(swarm.entry().as_str(), "PlannerAgent");
        assert_eq!(swarm.finalizer().as_str(), "PlannerAgent");
        assert_eq!(swarm.agent_names().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let err = registry().create_agent("Ghost").await.err().unwrap();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
