use crate::error::{Result, VeoError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key under which the API key is persisted.
pub const CREDENTIAL_KEY: &str = "gemini-api-key";

/// Holds a single API key until it is explicitly cleared.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, key: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;

    async fn has_key(&self) -> bool {
        matches!(self.load().await, Ok(Some(_)))
    }
}

fn normalize(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(VeoError::InvalidRequest("API key must not be empty".into()));
    }
    Ok(key.to_string())
}

/// JSON object file shared with other small settings, one entry per key.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<String>> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(CREDENTIAL_KEY)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty()))
    }

    async fn save(&self, key: &str) -> Result<()> {
        let key = normalize(key)?;
        let mut entries = self.read_entries().await?;
        entries.insert(CREDENTIAL_KEY.to_string(), key);
        self.write_entries(&entries).await?;
        log::info!("API key saved to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.read_entries().await?;
        if entries.remove(CREDENTIAL_KEY).is_some() {
            self.write_entries(&entries).await?;
            log::info!("API key removed from {}", self.path.display());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    key: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Mutex::new(Some(key.into())),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<String>> {
        let key = self
            .key
            .lock()
            .map_err(|e| VeoError::Config(format!("credential lock poisoned: {}", e)))?;
        Ok(key.clone())
    }

    async fn save(&self, key: &str) -> Result<()> {
        let key = normalize(key)?;
        let mut slot = self
            .key
            .lock()
            .map_err(|e| VeoError::Config(format!("credential lock poisoned: {}", e)))?;
        *slot = Some(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut slot = self
            .key
            .lock()
            .map_err(|e| VeoError::Config(format!("credential lock poisoned: {}", e)))?;
        *slot = None;
        Ok(())
    }
}
