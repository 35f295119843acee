use async_trait::async_trait;
use dnsguard_domain::{DomainError, ManifestDocument};

/// Where refreshed manifests come from.
#[async_trait]
pub trait ManifestSourcePort: Send + Sync {
    /// Fetches the current document. `Ok(None)` when nothing changed since
    /// the previous successful fetch.
    async fn fetch(&self) -> Result<Option<ManifestDocument>, DomainError>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}
