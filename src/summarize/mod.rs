//! Bounded summarization
//!
//! Fetched content is reduced to a digest of at most `token_budget` words while
//! the complete text is always persisted through the [`ArtifactStore`]. Agents
//! see the digest inline and the full text only by reference.
//!
//! Two digest modes exist:
//!
//! - [`SummaryMode::Truncate`] keeps the first `token_budget` words verbatim.
//! - [`SummaryMode::Abstractive`] asks a [`Condenser`] for a summary of roughly
//!   20-30% of the original length, then truncates that to the budget. Any
//!   condenser failure falls back to truncation.
//!
//! Words are produced by [`tokenize`]: runs of word characters and individual
//! punctuation marks. The digest joins words with single spaces, so its
//! whitespace word count never exceeds the budget.

mod condenser;

use crate::artifacts::{ArtifactId, ArtifactKind, ArtifactStore};
use crate::types::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

pub use condenser::{Condenser, LlmCondenser, CONDENSE_PROMPT};

/// Digest returned for empty or whitespace-only input.
///
/// Callers must check for this value rather than for an empty string.
pub const NO_CONTENT_SENTINEL: &str = "Error: No content extracted.";

static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+(?:['’]\w+)*|[^\w\s]").expect("word pattern is a valid regex")
});

/// Split text into words and punctuation marks
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Keep the first `budget` tokens of `text`, joined by single spaces
pub fn truncate_words(text: &str, budget: usize) -> String {
    tokenize(text)
        .into_iter()
        .take(budget)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace-delimited word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Keep the leading words verbatim
    Truncate,
    /// Delegate condensation, then enforce the budget
    #[default]
    Abstractive,
}

/// Result of [`BoundedSummarizer::summarize`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Inline digest, at most `token_budget` words
    pub digest: String,
    /// Reference to the untruncated text
    pub full_reference: ArtifactId,
    /// Mode that actually produced the digest after any fallback
    pub mode: SummaryMode,
}

/// Produces budgeted digests and persists the full text
pub struct BoundedSummarizer {
    store: Arc<dyn ArtifactStore>,
    condenser: Option<Arc<dyn Condenser>>,
    mode: SummaryMode,
}

impl BoundedSummarizer {
    /// Summarizer that only truncates
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            condenser: None,
            mode: SummaryMode::Truncate,
        }
    }

    /// Summarizer that condenses through `condenser` before truncating
    pub fn with_condenser(store: Arc<dyn ArtifactStore>, condenser: Arc<dyn Condenser>) -> Self {
        Self {
            store,
            condenser: Some(condenser),
            mode: SummaryMode::Abstractive,
        }
    }

    pub fn with_mode(mut self, mode: SummaryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> SummaryMode {
        self.mode
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Persist `text` and return its digest in the summarizer's default mode
    pub async fn summarize(
        &self,
        kind: ArtifactKind,
        text: &str,
        token_budget: usize,
        producer_id: &str,
    ) -> Result<Summary> {
        self.summarize_with(self.mode, kind, text, token_budget, producer_id)
            .await
    }

    /// Persist `text` and return its digest in an explicit mode.
    ///
    /// The full text is written before any digesting is attempted, so a failed
    /// condensation never loses content.
    pub async fn summarize_with(
        &self,
        mode: SummaryMode,
        kind: ArtifactKind,
        text: &str,
        token_budget: usize,
        producer_id: &str,
    ) -> Result<Summary> {
        let artifact = self.store.write(kind, text, producer_id).await?;
        let (digest, mode) = self.digest(mode, text, token_budget).await;

        tracing::debug!(
            producer = producer_id,
            artifact = %artifact.id,
            digest_words = word_count(&digest),
            token_budget,
            "Summarized content"
        );

        Ok(Summary {
            digest,
            full_reference: artifact.id,
            mode,
        })
    }

    /// Digest `text` without persisting it.
    ///
    /// Returns the digest and the mode that produced it.
    pub async fn digest(
        &self,
        mode: SummaryMode,
        text: &str,
        token_budget: usize,
    ) -> (String, SummaryMode) {
        if text.trim().is_empty() {
            return (NO_CONTENT_SENTINEL.to_string(), mode);
        }

        if mode == SummaryMode::Abstractive {
            match &self.condenser {
                Some(condenser) => match condenser.condense(text).await {
                    Ok(condensed) if !condensed.trim().is_empty() => {
                        return (
                            truncate_words(&condensed, token_budget),
                            SummaryMode::Abstractive,
                        );
                    }
                    Ok(_) => {
                        tracing::warn!("Condenser returned no text, falling back to truncation");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Condensation failed, falling back to truncation");
                    }
                },
                None => {
                    tracing::debug!("No condenser configured, truncating");
                }
            }
        }

        (truncate_words(text, token_budget), SummaryMode::Truncate)
    }
}
