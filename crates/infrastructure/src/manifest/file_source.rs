use async_trait::async_trait;
use dnsguard_application::ports::ManifestSourcePort;
use dnsguard_domain::config::ManifestConfig;
use dnsguard_domain::{DomainError, ManifestDocument, ManifestFormat};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Reads a manifest from a local file written by an external fetcher.
///
/// Unchanged content (same SHA-256) is reported as `None` so the refresh job
/// does not rebuild an identical rule index.
pub struct FileManifestSource {
    path: PathBuf,
    format: ManifestFormat,
    last_digest: Mutex<Option<[u8; 32]>>,
}

impl FileManifestSource {
    pub fn new(path: impl Into<PathBuf>, format: ManifestFormat) -> Self {
        Self {
            path: path.into(),
            format,
            last_digest: Mutex::new(None),
        }
    }

    /// `None` when the configuration names no manifest file.
    pub fn from_config(config: &ManifestConfig) -> Option<Self> {
        let path = config.path.as_deref()?;
        Some(Self::new(path, config.effective_format()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String, DomainError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DomainError::IoError(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl ManifestSourcePort for FileManifestSource {
    async fn fetch(&self) -> Result<Option<ManifestDocument>, DomainError> {
        let raw = self.read().await?;
        let digest: [u8; 32] = Sha256::digest(raw.as_bytes()).into();

        let unchanged = {
            let last = self.last_digest.lock().unwrap_or_else(|p| p.into_inner());
            *last == Some(digest)
        };
        if unchanged {
            debug!(path = %self.path.display(), "Manifest unchanged");
            return Ok(None);
        }

        let document = self.format.parse_document(&raw)?;
        *self.last_digest.lock().unwrap_or_else(|p| p.into_inner()) = Some(digest);
        Ok(Some(document))
    }

    fn describe(&self) -> String {
        format!("file:{} ({})", self.path.display(), self.format)
    }
}
