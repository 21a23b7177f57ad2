use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Receives finished videos.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes each video into a fixed directory, overwriting same-named files.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for DirectoryDownloader {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes).await?;
        log::info!("💾 Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
