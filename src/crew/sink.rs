//! Destinations for task artifacts.

use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Persist one artifact. `artifact` is a bare name such as
    /// `final-itinerary`; the sink decides where and how it is stored.
    async fn write(&self, artifact: &str, content: &str) -> anyhow::Result<()>;
}

/// Writes each artifact to `<dir>/<artifact>.md`, overwriting prior runs.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, artifact: &str) -> PathBuf {
        self.dir.join(format!("{artifact}.md"))
    }
}

#[async_trait]
impl OutputSink for FileSink {
    async fn write(&self, artifact: &str, content: &str) -> anyhow::Result<()> {
        if artifact.is_empty() || artifact.contains(['/', '\\']) || artifact.starts_with('.') {
            anyhow::bail!("invalid artifact name {artifact:?}");
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.artifact_path(artifact);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "artifact written");
        Ok(())
    }
}

/// Keeps artifacts in memory. Used by the web UI, which renders results
/// instead of writing files.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<(String, String)> {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, artifact: &str) -> Option<String> {
        self.artifacts()
            .into_iter()
            .rev()
            .find(|(name, _)| name == artifact)
            .map(|(_, content)| content)
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn write(&self, artifact: &str, content: &str) -> anyhow::Result<()> {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((artifact.to_string(), content.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_sink_creates_dir_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(tmp.path().join("out"));

        sink.write("final-itinerary", "first").await.unwrap();
        sink.write("final-itinerary", "second").await.unwrap();

        let written = std::fs::read_to_string(sink.artifact_path("final-itinerary")).unwrap();
        assert_eq!(written, "second");
    }

    #[tokio::test]
    async fn file_sink_rejects_path_like_names() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(tmp.path());

        assert!(sink.write("../escape", "x").await.is_err());
        assert!(sink.write("", "x").await.is_err());
    }

    #[tokio::test]
    async fn memory_sink_returns_latest_artifact() {
        let sink = MemorySink::new();
        sink.write("guide-report", "a").await.unwrap();
        sink.write("guide-report", "b").await.unwrap();

        assert_eq!(sink.get("guide-report").as_deref(), Some("b"));
        assert_eq!(sink.artifacts().len(), 2);
    }
}
