//! Filesystem adapter behind the storage port. Workbook reads and report
//! writes resolve against one base directory.

use crate::core::Storage;
use crate::utils::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base: PathBuf,
}

impl LocalStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Adapter rooted at the working directory, so workbook paths from the
    /// command line resolve exactly as given.
    pub fn current_dir() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.base.join(path);
        tracing::debug!(path = %full.display(), "reading file");
        let bytes = tokio::fs::read(&full).await?;
        tracing::debug!(path = %full.display(), bytes = bytes.len(), "file read");
        Ok(bytes)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full = self.base.join(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, data).await?;
        tracing::info!(path = %full.display(), bytes = data.len(), "file written");
        Ok(())
    }
}
