use async_trait::async_trait;
use dnsguard_application::ports::{
    BypassGrantStore, CacheEntry, CacheStats, Clock, ManifestSourcePort, ResponseCachePort,
    RuleEvaluatorPort, TelemetryPort,
};
use dnsguard_domain::{
    BypassGrant, CachePolicyTable, DnsAnswer, DnsQuery, DomainError, GrantId, ManifestDocument,
    RuleSet, TelemetryEvent, TtlResolution, Verdict,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ============================================================================
// ManualClock
// ============================================================================

pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

// ============================================================================
// SweepCountingCache
// ============================================================================

/// Cache stub whose sweep reports a fixed number of removals.
pub struct SweepCountingCache {
    pub sweeps: AtomicUsize,
    removed_per_sweep: usize,
}

impl SweepCountingCache {
    pub fn new(removed_per_sweep: usize) -> Self {
        Self {
            sweeps: AtomicUsize::new(0),
            removed_per_sweep,
        }
    }

    pub fn sweeps(&self) -> usize {
        self.sweeps.load(Ordering::SeqCst)
    }
}

impl ResponseCachePort for SweepCountingCache {
    fn lookup(&self, _query: &DnsQuery) -> Option<CacheEntry> {
        None
    }

    fn store(&self, _query: &DnsQuery, _answer: &DnsAnswer) -> TtlResolution {
        TtlResolution::CachingDisabled
    }

    fn sweep_expired(&self) -> usize {
        self.sweeps.fetch_add(1, Ordering::SeqCst);
        self.removed_per_sweep
    }

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn policy(&self) -> Arc<CachePolicyTable> {
        Arc::new(CachePolicyTable::default())
    }

    fn set_user_ttl(&self, _domain: Option<&str>, _ttl_secs: u32) -> Result<(), DomainError> {
        Ok(())
    }

    fn add_user_bypass(&self, _domain: &str) -> Result<(), DomainError> {
        Ok(())
    }

    fn flush(&self) -> Result<usize, DomainError> {
        Ok(0)
    }
}

// ============================================================================
// GrantTable (rule evaluator + grant store)
// ============================================================================

#[derive(Default)]
pub struct GrantTable {
    grants: Mutex<Vec<BypassGrant>>,
    rule_count: Mutex<usize>,
    origin: Mutex<Option<Arc<str>>>,
}

impl GrantTable {
    pub fn grant_count(&self) -> usize {
        self.grants.lock().unwrap().len()
    }
}

impl RuleEvaluatorPort for GrantTable {
    fn evaluate(&self, _name: &str) -> Verdict {
        Verdict::default_allow()
    }

    fn replace_rules(&self, rules: RuleSet) -> usize {
        *self.rule_count.lock().unwrap() = rules.len();
        *self.origin.lock().unwrap() = rules.origin.clone();
        rules.len()
    }

    fn rule_count(&self) -> usize {
        *self.rule_count.lock().unwrap()
    }

    fn origin(&self) -> Option<Arc<str>> {
        self.origin.lock().unwrap().clone()
    }
}

impl BypassGrantStore for GrantTable {
    fn insert_grant(&self, grant: BypassGrant) {
        self.grants.lock().unwrap().push(grant);
    }

    fn revoke_grant(&self, id: GrantId) -> Option<BypassGrant> {
        let mut grants = self.grants.lock().unwrap();
        let pos = grants.iter().position(|g| g.id == id)?;
        Some(grants.remove(pos))
    }

    fn active_grants(&self, now: Instant) -> Vec<BypassGrant> {
        self.grants
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.is_active(now))
            .cloned()
            .collect()
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let mut grants = self.grants.lock().unwrap();
        let before = grants.len();
        grants.retain(|g| g.is_active(now));
        before - grants.len()
    }
}

// ============================================================================
// ScriptedManifestSource
// ============================================================================

pub struct ScriptedManifestSource {
    script: Mutex<VecDeque<Result<Option<ManifestDocument>, DomainError>>>,
}

impl ScriptedManifestSource {
    pub fn new(script: Vec<Result<Option<ManifestDocument>, DomainError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

#[async_trait]
impl ManifestSourcePort for ScriptedManifestSource {
    async fn fetch(&self) -> Result<Option<ManifestDocument>, DomainError> {
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

pub fn manifest(identifier: &str, blocked: &[&str]) -> ManifestDocument {
    let json = serde_json::json!({
        "identifier": identifier,
        "format_version": 1,
        "sources": [{ "id": "main", "block": blocked }],
    });
    serde_json::from_value(json).unwrap()
}

// ============================================================================
// NullTelemetry
// ============================================================================

pub struct NullTelemetry;

impl TelemetryPort for NullTelemetry {
    fn emit(&self, _event: TelemetryEvent) {}

    fn is_verbose(&self) -> bool {
        false
    }

    fn dropped(&self) -> u64 {
        0
    }
}
