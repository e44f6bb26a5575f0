//! Shared memory of transcript fragments across runs.
//!
//! This module provides:
//! - The [`SharedMemory`] append/query contract
//! - An in-process [`InMemoryStore`] ranked by keyword overlap
//! - A [`JsonlMemoryStore`] that keeps fragments in a JSON Lines file
//! - Formatting of recalled fragments for system prompts
//!
//! Memory is optional. Agents whose descriptor carries a memory view receive
//! the best matching fragments for the current task in their system prompt;
//! the orchestrator appends the agent messages of every finished run.

use crate::types::{AgentName, Message, MessageKind, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Maximum number of fragments to include in a prompt to avoid token overflow.
pub const MAX_FRAGMENTS_IN_PROMPT: usize = 20;

/// Maximum characters of a single fragment quoted into a prompt.
pub const MAX_FRAGMENT_CHARS: usize = 500;

/// One remembered transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFragment {
    pub run_id: String,
    pub sender: AgentName,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MemoryFragment {
    pub fn from_message(run_id: &str, message: &Message) -> Self {
        Self {
            run_id: run_id.to_string(),
            sender: message.sender.clone(),
            content: message.content.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Append/query store consulted by agents for context beyond the current run.
///
/// Implementations must tolerate concurrent writers from independent runs.
#[async_trait]
pub trait SharedMemory: Send + Sync {
    async fn append(&self, fragment: MemoryFragment) -> Result<()>;

    /// Up to `limit` fragments relevant to `query`, best match first
    async fn query(&self, query: &str, limit: usize) -> Result<Vec<MemoryFragment>>;
}

/// Process-local shared memory
#[derive(Default)]
pub struct InMemoryStore {
    fragments: RwLock<Vec<MemoryFragment>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fragments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.read().is_empty()
    }
}

#[async_trait]
impl SharedMemory for InMemoryStore {
    async fn append(&self, fragment: MemoryFragment) -> Result<()> {
        self.fragments.write().push(fragment);
        Ok(())
    }

    async fn query(&self, query: &str, limit: usize) -> Result<Vec<MemoryFragment>> {
        let terms = keywords(query);
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let fragments = self.fragments.read();
        let mut scored: Vec<(usize, &MemoryFragment)> = fragments
            .iter()
            .filter_map(|f| {
                let score = keywords(&f.content).intersection(&terms).count();
                (score > 0).then_some((score, f))
            })
            .collect();

        // Higher overlap first, newer first on ties
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.created_at.cmp(&a.1.created_at)));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, f)| f.clone())
            .collect())
    }
}

/// Shared memory persisted as one JSON object per line.
///
/// Fragments are loaded once on open and queried in process; appends go to
/// the end of the file, so memory survives across CLI invocations.
pub struct JsonlMemoryStore {
    path: PathBuf,
    inner: InMemoryStore,
    file_lock: tokio::sync::Mutex<()>,
}

impl JsonlMemoryStore {
    /// Open `path`, loading any fragments it already holds. A missing file is
    /// an empty memory; unreadable lines are skipped.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = InMemoryStore::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let mut fragments = inner.fragments.write();
                for (line_no, line) in contents.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<MemoryFragment>(line) {
                        Ok(fragment) => fragments.push(fragment),
                        Err(e) => tracing::warn!(
                            path = %path.display(),
                            line = line_no + 1,
                            error = %e,
                            "Skipping unreadable memory fragment"
                        ),
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(path = %path.display(), fragments = inner.len(), "Memory loaded");
        Ok(Self {
            path,
            inner,
            file_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl SharedMemory for JsonlMemoryStore {
    async fn append(&self, fragment: MemoryFragment) -> Result<()> {
        let mut line = serde_json::to_string(&fragment)?;
        line.push('\n');

        {
            let _guard = self.file_lock.lock().await;
            if let Some(parent) = self.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }

        self.inner.append(fragment).await
    }

    async fn query(&self, query: &str, limit: usize) -> Result<Vec<MemoryFragment>> {
        self.inner.query(query, limit).await
    }
}

/// Lowercased words of three or more characters
fn keywords(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Whether a transcript message is worth remembering across runs
pub fn is_memorable(message: &Message) -> bool {
    matches!(message.kind, MessageKind::Text | MessageKind::Termination)
        && message.sender.as_str() != AgentName::USER
        && message.sender.as_str() != AgentName::ORCHESTRATOR
        && !message.content.trim().is_empty()
}

/// Formats recalled fragments into a string suitable for system prompts.
///
/// Returns an empty string when there is nothing to include.
pub fn format_fragments_for_prompt(fragments: &[MemoryFragment]) -> String {
    if fragments.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = fragments
        .iter()
        .take(MAX_FRAGMENTS_IN_PROMPT)
        .map(|f| {
            let content: String = f.content.chars().take(MAX_FRAGMENT_CHARS).collect();
            format!("- [{}] {}", f.sender, content.replace('\n', " "))
        })
        .collect();

    format!("Relevant notes from earlier research:\n{}", lines.join("\n"))
}

/// Estimates token count for a piece of text (rough approximation).
///
/// Uses a simple heuristic of ~4 characters per token for English text.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}
