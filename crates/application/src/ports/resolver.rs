use async_trait::async_trait;
use dnsguard_domain::{DnsAnswer, DnsQuery, DomainError, InterfaceId};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Resolution {
    pub answer: DnsAnswer,
    pub interface: Option<InterfaceId>,
    pub attempts: u32,
}

/// Upstream resolution with interface selection and retries.
#[async_trait]
pub trait ResolverPort: Send + Sync {
    /// Resolves `query`. No backoff wait is started that would end past
    /// `deadline`.
    async fn resolve(
        &self,
        query: &DnsQuery,
        deadline: Option<Instant>,
    ) -> Result<Resolution, DomainError>;
}
