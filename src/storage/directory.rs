use crate::{
    error::{Result, StabilityError},
    storage::traits::ArtifactStore,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Writes artifacts into a single directory, creating it on demand.
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for DirectoryStore {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(StabilityError::InvalidRequest(format!(
                "invalid artifact name: {:?}",
                file_name
            )));
        }

        fs::create_dir_all(&self.root).await?;

        let final_path = self.root.join(file_name);
        let partial_path = self.root.join(format!(".{}.part", file_name));

        fs::write(&partial_path, bytes).await?;
        if let Err(e) = fs::rename(&partial_path, &final_path).await {
            let _ = fs::remove_file(&partial_path).await;
            return Err(e.into());
        }

        log::debug!(
            "Saved {} bytes to {}",
            bytes.len(),
            final_path.display()
        );
        Ok(final_path)
    }
}
