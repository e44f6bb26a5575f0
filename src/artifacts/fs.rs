use crate::artifacts::{normalize_id, Artifact, ArtifactKind, ArtifactStore};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Artifact store writing one file per artifact below a root directory
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an id (or a path an agent copied from the transcript) onto a file
    /// below the root. Anything escaping the root resolves to `None`.
    fn resolve(&self, raw: &str) -> Option<PathBuf> {
        let id = normalize_id(raw);
        if id.is_empty() {
            return None;
        }

        let candidate = Path::new(id);
        let root = strip_cur_dir(&self.root);
        let relative = candidate
            .strip_prefix(&self.root)
            .or_else(|_| candidate.strip_prefix(&root))
            .unwrap_or(candidate);

        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }

        Some(self.root.join(relative))
    }
}

fn strip_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn write(
        &self,
        kind: ArtifactKind,
        content: &str,
        created_by: &str,
    ) -> Result<Artifact> {
        let now = Utc::now();
        let id = kind.new_id(now);
        let path = self.root.join(id.as_str());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // create_new keeps artifacts write-once even if an id ever collided
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(
            artifact = %id,
            created_by,
            bytes = content.len(),
            "Artifact written"
        );

        Ok(Artifact {
            id,
            kind,
            created_by: created_by.to_string(),
            created_at: now,
            size_bytes: content.len(),
        })
    }

    async fn read(&self, id: &str) -> Result<String> {
        let path = self
            .resolve(id)
            .ok_or_else(|| AppError::ArtifactNotFound(id.to_string()))?;

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound || e.kind() == ErrorKind::IsADirectory => {
                Err(AppError::ArtifactNotFound(id.to_string()))
            }
            Err(e) => Err(AppError::Io(e)),
        }
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
