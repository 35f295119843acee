use dnsguard_domain::{CachePolicyTable, DnsAnswer, DnsQuery, DomainError, TtlResolution};
use std::sync::Arc;
use std::time::Instant;

/// A cached answer and its lifetime.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub answer: DnsAnswer,
    pub ttl_secs: u32,
    pub inserted_at: Instant,
    pub expires_at: Instant,
}

impl CacheEntry {
    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub enabled: bool,
    pub entries: usize,
    pub capacity: usize,
    pub default_ttl_secs: u32,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub skipped: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub hit_rate: f64,
}

/// TTL-bounded answer store keyed by (name, record type).
pub trait ResponseCachePort: Send + Sync {
    /// Live entry for the query, if any. An expired entry is removed and
    /// reported as a miss.
    fn lookup(&self, query: &DnsQuery) -> Option<CacheEntry>;

    /// Stores `answer` under the policy's TTL. Returns how the policy
    /// resolved; anything but `Cache` means nothing was stored.
    fn store(&self, query: &DnsQuery, answer: &DnsAnswer) -> TtlResolution;

    /// Removes every expired entry. Returns how many were removed.
    fn sweep_expired(&self) -> usize;

    fn stats(&self) -> CacheStats;

    fn policy(&self) -> Arc<CachePolicyTable>;

    /// Runtime TTL change (global default when `domain` is `None`).
    fn set_user_ttl(&self, domain: Option<&str>, ttl_secs: u32) -> Result<(), DomainError>;

    /// Runtime addition to the bypass set. Existing entries under the
    /// domain are dropped.
    fn add_user_bypass(&self, domain: &str) -> Result<(), DomainError>;

    /// Drops every entry. Returns how many were removed.
    fn flush(&self) -> Result<usize, DomainError>;
}
