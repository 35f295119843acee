use super::{CacheKey, CacheMetrics};
use arc_swap::{ArcSwap, Guard};
use dashmap::DashMap;
use dnsguard_application::ports::{CacheEntry, CacheStats, Clock, Reconfigurable, ResponseCachePort};
use dnsguard_domain::validators::{matches_suffix, normalize_domain};
use dnsguard_domain::{
    CachePolicyTable, ConfigSnapshot, DnsAnswer, DnsQuery, DomainError, TtlResolution,
};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Share of capacity freed in one eviction pass.
const EVICTION_BATCH_PERCENT: usize = 10;

struct StoredAnswer {
    answer: DnsAnswer,
    ttl_secs: u32,
    inserted_at: Instant,
    expires_at: Instant,
    /// Monotonic insertion number; eviction removes the lowest first.
    seq: u64,
}

impl StoredAnswer {
    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    fn to_entry(&self) -> CacheEntry {
        CacheEntry {
            answer: self.answer.clone(),
            ttl_secs: self.ttl_secs,
            inserted_at: self.inserted_at,
            expires_at: self.expires_at,
        }
    }
}

/// TTL-bounded answer cache.
///
/// Entries live in a sharded `DashMap`, so lookups and stores on different
/// keys do not contend. The policy table is an `ArcSwap` snapshot read once
/// per store. Expired entries are dropped lazily on lookup and in bulk by
/// `sweep_expired`; over capacity, the oldest insertions go first
/// regardless of how often they are read.
pub struct ResponseCache {
    entries: DashMap<CacheKey, StoredAnswer, FxBuildHasher>,
    policy: ArcSwap<CachePolicyTable>,
    max_entries: AtomicUsize,
    next_seq: AtomicU64,
    metrics: CacheMetrics,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(policy: CachePolicyTable, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        info!(
            max_entries,
            enabled = policy.is_enabled(),
            default_ttl = policy.effective_default_ttl(),
            overrides = policy.overrides().len(),
            "Initializing response cache"
        );

        Self {
            entries: DashMap::with_capacity_and_hasher(max_entries.min(4096), FxBuildHasher),
            policy: ArcSwap::from_pointee(policy),
            max_entries: AtomicUsize::new(max_entries.max(1)),
            next_seq: AtomicU64::new(0),
            metrics: CacheMetrics::default(),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    fn capacity(&self) -> usize {
        self.max_entries.load(Ordering::Relaxed)
    }

    fn check_capacity(&self) -> Result<(), DomainError> {
        let max = self.capacity();
        if self.entries.len() > max {
            Err(DomainError::CacheCapacityExceeded(max))
        } else {
            Ok(())
        }
    }

    /// Frees room after an overflow: expired entries first, then the
    /// oldest insertions down to 90% of capacity.
    fn reclaim(&self, max: usize) {
        let expired = self.sweep_expired();
        let len = self.entries.len();
        if len <= max {
            return;
        }

        let target = max - max * EVICTION_BATCH_PERCENT / 100;
        let excess = len.saturating_sub(target).max(1);

        let mut candidates: Vec<(u64, CacheKey)> = self
            .entries
            .iter()
            .map(|e| (e.value().seq, e.key().clone()))
            .collect();
        if excess < candidates.len() {
            candidates.select_nth_unstable_by_key(excess - 1, |(seq, _)| *seq);
            candidates.truncate(excess);
        }

        let mut evicted = 0;
        for (seq, key) in candidates {
            if self.entries.remove_if(&key, |_, e| e.seq == seq).is_some() {
                evicted += 1;
            }
        }
        CacheMetrics::add(&self.metrics.evictions, evicted);
        debug!(expired, evicted, remaining = self.entries.len(), "Cache capacity reclaimed");
    }

    /// Applies `change` to the policy table with compare-and-swap so a
    /// concurrent reload is never overwritten by a stale copy.
    fn update_policy<F>(&self, change: F) -> Result<Arc<CachePolicyTable>, DomainError>
    where
        F: Fn(&CachePolicyTable) -> Result<CachePolicyTable, DomainError>,
    {
        let mut current = self.policy.load_full();
        loop {
            let next = Arc::new(change(&current)?);
            let previous = self.policy.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&previous, &current) {
                return Ok(next);
            }
            current = Guard::into_inner(previous);
        }
    }

    /// Whether the current policy would cache `name` at all.
    fn admits(&self, name: &str) -> bool {
        matches!(
            self.policy.load().resolve(name),
            TtlResolution::Cache { ttl_secs } if ttl_secs > 0
        )
    }

    fn drop_matching(&self, domain: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| !matches_suffix(domain, &k.domain));
        before.saturating_sub(self.entries.len())
    }
}

impl ResponseCachePort for ResponseCache {
    fn lookup(&self, query: &DnsQuery) -> Option<CacheEntry> {
        let key = CacheKey::for_query(query);
        let now = self.clock.now();

        // Entries stored before a bypass or disable landed are never served.
        if !self.admits(&query.domain) {
            if self.entries.remove(&key).is_some() {
                debug!(domain = %query.domain, "Dropped entry no longer admitted by policy");
            }
            CacheMetrics::bump(&self.metrics.misses);
            return None;
        }

        {
            match self.entries.get(&key) {
                Some(stored) if !stored.is_expired(now) => {
                    CacheMetrics::bump(&self.metrics.hits);
                    return Some(stored.to_entry());
                }
                Some(_) => {}
                None => {
                    CacheMetrics::bump(&self.metrics.misses);
                    return None;
                }
            }
        }

        if self
            .entries
            .remove_if(&key, |_, stored| stored.is_expired(now))
            .is_some()
        {
            CacheMetrics::bump(&self.metrics.expirations);
        }
        CacheMetrics::bump(&self.metrics.misses);
        None
    }

    fn store(&self, query: &DnsQuery, answer: &DnsAnswer) -> TtlResolution {
        let resolution = self.policy.load().resolve(&query.domain);

        let ttl_secs = match resolution {
            TtlResolution::Cache { ttl_secs } if ttl_secs > 0 => ttl_secs,
            TtlResolution::Cache { .. } => {
                CacheMetrics::bump(&self.metrics.skipped);
                return TtlResolution::NotCacheable;
            }
            other => {
                CacheMetrics::bump(&self.metrics.skipped);
                return other;
            }
        };

        let now = self.clock.now();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let stored = StoredAnswer {
            answer: answer.clone(),
            ttl_secs,
            inserted_at: now,
            expires_at: now + Duration::from_secs(u64::from(ttl_secs)),
            seq,
        };
        let key = CacheKey::for_query(query);
        self.entries.insert(key.clone(), stored);

        // Policy may have been swapped since the resolve above.
        if !self.admits(&query.domain) {
            self.entries.remove_if(&key, |_, e| e.seq == seq);
            CacheMetrics::bump(&self.metrics.skipped);
            return match self.policy.load().resolve(&query.domain) {
                TtlResolution::Cache { .. } => TtlResolution::NotCacheable,
                other => other,
            };
        }
        CacheMetrics::bump(&self.metrics.insertions);

        if let Err(DomainError::CacheCapacityExceeded(max)) = self.check_capacity() {
            self.reclaim(max);
        }

        resolution
    }

    fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, stored| !stored.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        CacheMetrics::add(&self.metrics.expirations, removed);
        removed
    }

    fn stats(&self) -> CacheStats {
        let policy = self.policy.load();
        CacheStats {
            enabled: policy.is_enabled(),
            entries: self.entries.len(),
            capacity: self.capacity(),
            default_ttl_secs: policy.effective_default_ttl(),
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            insertions: self.metrics.insertions.load(Ordering::Relaxed),
            skipped: self.metrics.skipped.load(Ordering::Relaxed),
            evictions: self.metrics.evictions.load(Ordering::Relaxed),
            expirations: self.metrics.expirations.load(Ordering::Relaxed),
            hit_rate: self.metrics.hit_rate(),
        }
    }

    fn policy(&self) -> Arc<CachePolicyTable> {
        self.policy.load_full()
    }

    fn set_user_ttl(&self, domain: Option<&str>, ttl_secs: u32) -> Result<(), DomainError> {
        self.update_policy(|p| p.with_user_ttl(domain, ttl_secs))?;
        Ok(())
    }

    fn add_user_bypass(&self, domain: &str) -> Result<(), DomainError> {
        self.update_policy(|p| p.with_user_bypass(domain))?;
        let dropped = self.drop_matching(&normalize_domain(domain));
        debug!(domain, dropped, "Entries dropped for new bypass domain");
        Ok(())
    }

    fn flush(&self) -> Result<usize, DomainError> {
        self.policy.load().ensure_cache_adjustable()?;
        let removed = self.entries.len();
        self.entries.clear();
        Ok(removed)
    }
}

impl Reconfigurable for ResponseCache {
    fn component(&self) -> &'static str {
        "cache"
    }

    fn apply(&self, snapshot: &ConfigSnapshot) -> Result<(), DomainError> {
        let cache = &snapshot.config.cache;
        let policy = cache
            .policy_table()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))?;

        // Swap before purging; in-flight stores re-check the new table.
        let policy = Arc::new(policy);
        self.policy.store(Arc::clone(&policy));
        if !policy.is_enabled() {
            self.entries.clear();
        } else {
            for domain in policy.bypass_domains() {
                self.drop_matching(domain);
            }
        }
        self.max_entries
            .store(cache.max_entries.max(1), Ordering::Relaxed);

        if let Err(DomainError::CacheCapacityExceeded(max)) = self.check_capacity() {
            self.reclaim(max);
        }
        Ok(())
    }
}
