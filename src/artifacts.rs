//! Persisted JSON artifacts of the latest run.
//!
//! Each artifact is one whole document that a run replaces wholesale. Reading
//! an artifact that was never written yields an empty collection.

use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    errors::ServiceResult,
    models::{ForecastPoint, ModelRegistryEntry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Artifact {
    #[strum(serialize = "forecasts")]
    Forecasts,
    #[strum(serialize = "registry")]
    Registry,
}

impl Artifact {
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Forecasts => "forecasts-latest.json",
            Artifact::Registry => "registry-latest.json",
        }
    }
}

/// Whole-document storage for artifacts. Last writer wins.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Replaces the document's content.
    async fn put(&self, artifact: Artifact, body: Vec<u8>) -> ServiceResult<()>;

    /// Returns the document's content, or `None` if it was never written.
    async fn get(&self, artifact: Artifact) -> ServiceResult<Option<Vec<u8>>>;
}

/// Stores artifacts as files in one directory.
///
/// Writes go to a temporary sibling that is then renamed over the target, so a
/// reader sees either the previous or the new document.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, artifact: Artifact) -> PathBuf {
        self.dir.join(artifact.file_name())
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn put(&self, artifact: Artifact, body: Vec<u8>) -> ServiceResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let target = self.path(artifact);
        let tmp = self.dir.join(format!(".{}.tmp", artifact.file_name()));
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, &target).await?;
        debug!(%artifact, bytes = body.len(), "artifact written");
        Ok(())
    }

    async fn get(&self, artifact: Artifact) -> ServiceResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(artifact)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keeps artifacts in process memory.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    documents: RwLock<HashMap<Artifact, Vec<u8>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(&self, artifact: Artifact, body: Vec<u8>) -> ServiceResult<()> {
        self.documents.write().await.insert(artifact, body);
        Ok(())
    }

    async fn get(&self, artifact: Artifact) -> ServiceResult<Option<Vec<u8>>> {
        Ok(self.documents.read().await.get(&artifact).cloned())
    }
}

pub async fn save_json<T>(store: &dyn ArtifactStore, artifact: Artifact, data: &T) -> ServiceResult<()>
where
    T: Serialize + ?Sized + Sync,
{
    let body = serde_json::to_vec(data)?;
    store.put(artifact, body).await
}

pub async fn load_json<T>(store: &dyn ArtifactStore, artifact: Artifact) -> ServiceResult<Vec<T>>
where
    T: DeserializeOwned,
{
    match store.get(artifact).await? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Vec::new()),
    }
}

pub async fn latest_forecasts(store: &dyn ArtifactStore) -> ServiceResult<Vec<ForecastPoint>> {
    load_json(store, Artifact::Forecasts).await
}

pub async fn latest_registry(store: &dyn ArtifactStore) -> ServiceResult<Vec<ModelRegistryEntry>> {
    load_json(store, Artifact::Registry).await
}
