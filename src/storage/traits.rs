use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Destination for generated artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes `bytes` under `file_name` and returns the final path. The path
    /// is only returned once the file is complete.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}
