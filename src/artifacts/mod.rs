//! Write-once artifact storage
//!
//! Large tool outputs and final deliverables are kept out of the transcript.
//! Tools write them here and put only the returned [`ArtifactId`] into the
//! conversation; agents read them back on demand through the `read_file` tool.
//!
//! # Namespaces
//!
//! Every artifact belongs to an [`ArtifactKind`] which decides its directory,
//! file prefix and extension. Storage locations are dated:
//!
//! ```text
//! search_results/2025-01-31/web_search_<uuid>.json
//! scrape_results/2025-01-31/web_scrape_<uuid>.txt
//! outputs/2025-01-31/output_<uuid>.md
//! ```
//!
//! There is no update or delete operation. Writing identical content twice
//! yields two independent artifacts.

/// Filesystem-backed store.
pub mod fs;
/// In-process store used by tests and ephemeral runs.
pub mod memory;

use crate::types::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use fs::FsArtifactStore;
pub use memory::MemoryArtifactStore;

/// Namespace an artifact is written into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Raw search provider payloads
    SearchResult,
    /// Full text extracted from scraped pages
    ScrapeResult,
    /// Deliverables written by agents
    Output,
}

impl ArtifactKind {
    pub fn dir(&self) -> &'static str {
        match self {
            ArtifactKind::SearchResult => "search_results",
            ArtifactKind::ScrapeResult => "scrape_results",
            ArtifactKind::Output => "outputs",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            ArtifactKind::SearchResult => "web_search",
            ArtifactKind::ScrapeResult => "web_scrape",
            ArtifactKind::Output => "output",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::SearchResult => "json",
            ArtifactKind::ScrapeResult => "txt",
            ArtifactKind::Output => "md",
        }
    }

    /// Generate a fresh, globally unique id inside this namespace
    pub fn new_id(&self, now: DateTime<Utc>) -> ArtifactId {
        ArtifactId(format!(
            "{}/{}/{}_{}.{}",
            self.dir(),
            now.format("%Y-%m-%d"),
            self.prefix(),
            Uuid::new_v4(),
            self.extension()
        ))
    }
}

/// Store-relative path identifying one artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata of a written artifact. The content itself stays in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub kind: ArtifactKind,
    /// Agent or tool name that produced the content
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: usize,
}

/// Durable, write-once content storage shared by every agent and tool of a run.
///
/// Implementations must be safe for concurrent writers; unique ids per write
/// mean no read-modify-write cycle ever happens.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `content` verbatim and return the metadata of the new artifact
    async fn write(&self, kind: ArtifactKind, content: &str, created_by: &str)
    -> Result<Artifact>;

    /// Read back the exact content of an artifact.
    ///
    /// Accepts the id as returned by [`ArtifactStore::write`], optionally
    /// prefixed with `./`. Fails with `AppError::ArtifactNotFound`.
    async fn read(&self, id: &str) -> Result<String>;

    /// Short human readable location, used in logs
    fn location(&self) -> String;
}

/// Strip the decorations agents tend to add around ids they copy from tool output
pub(crate) fn normalize_id(raw: &str) -> &str {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
    trimmed.strip_prefix("./").unwrap_or(trimmed)
}
