use crate::llm::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// System prompt used for delegated condensation
pub const CONDENSE_PROMPT: &str = "You are a precise summarizer. Summarize the text the user \
provides to roughly 20-30% of its original length. Keep names, numbers, dates and claims. \
Do not add commentary, headings or information that is not in the text.";

/// External condensation step used by abstractive summarization
#[async_trait]
pub trait Condenser: Send + Sync {
    async fn condense(&self, text: &str) -> Result<String>;
}

/// Condenser backed by a language model
pub struct LlmCondenser {
    llm: Arc<dyn LLMClient>,
}

impl LlmCondenser {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Condenser for LlmCondenser {
    async fn condense(&self, text: &str) -> Result<String> {
        let summary = self
            .llm
            .generate_with_system(CONDENSE_PROMPT, text)
            .await
            .map_err(|e| AppError::Agent(format!("condensation failed: {}", e)))?;

        Ok(summary.trim().to_string())
    }
}
