use crate::ports::{CacheStats, ResponseCachePort};
use dnsguard_domain::DomainError;
use std::sync::Arc;
use tracing::{info, instrument};

/// User-facing cache operations. Policy locks are enforced by the cache.
pub struct CacheControlUseCase {
    cache: Arc<dyn ResponseCachePort>,
}

impl CacheControlUseCase {
    pub fn new(cache: Arc<dyn ResponseCachePort>) -> Self {
        Self { cache }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[instrument(skip(self))]
    pub fn set_ttl(&self, domain: Option<&str>, ttl_secs: u32) -> Result<(), DomainError> {
        self.cache.set_user_ttl(domain, ttl_secs)?;
        info!(domain = domain.unwrap_or("*"), ttl_secs, "Cache TTL updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn add_bypass(&self, domain: &str) -> Result<(), DomainError> {
        self.cache.add_user_bypass(domain)?;
        info!(domain, "Cache bypass domain added");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn flush(&self) -> Result<usize, DomainError> {
        let removed = self.cache.flush()?;
        info!(removed, "Cache flushed");
        Ok(removed)
    }
}
