use crate::artifacts::{normalize_id, Artifact, ArtifactKind, ArtifactStore};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Artifact store that keeps everything in process memory
#[derive(Default)]
pub struct MemoryArtifactStore {
    entries: RwLock<HashMap<String, (Artifact, String)>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of artifacts written so far
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Metadata of every artifact of the given kind, oldest first
    pub fn list(&self, kind: ArtifactKind) -> Vec<Artifact> {
        let mut artifacts: Vec<Artifact> = self
            .entries
            .read()
            .values()
            .filter(|(artifact, _)| artifact.kind == kind)
            .map(|(artifact, _)| artifact.clone())
            .collect();
        artifacts.sort_by_key(|a| a.created_at);
        artifacts
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn write(
        &self,
        kind: ArtifactKind,
        content: &str,
        created_by: &str,
    ) -> Result<Artifact> {
        let now = Utc::now();
        let artifact = Artifact {
            id: kind.new_id(now),
            kind,
            created_by: created_by.to_string(),
            created_at: now,
            size_bytes: content.len(),
        };

        self.entries.write().insert(
            artifact.id.as_str().to_string(),
            (artifact.clone(), content.to_string()),
        );

        Ok(artifact)
    }

    async fn read(&self, id: &str) -> Result<String> {
        self.entries
            .read()
            .get(normalize_id(id))
            .map(|(_, content)| content.clone())
            .ok_or_else(|| AppError::ArtifactNotFound(id.to_string()))
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryArtifactStore::new();
        let artifact = store
            .write(ArtifactKind::SearchResult, "[]", "web_search")
            .await
            .unwrap();

        assert_eq!(store.read(artifact.id.as_str()).await.unwrap(), "[]");
        assert_eq!(store.len(), 1);
        assert_eq!(store.list(ArtifactKind::SearchResult).len(), 1);
        assert!(store.list(ArtifactKind::Output).is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_not_found() {
        let store = MemoryArtifactStore::new();
        let result = store.read("outputs/nope.md").await;
        assert!(matches!(result, Err(AppError::ArtifactNotFound(_))));
    }
}
