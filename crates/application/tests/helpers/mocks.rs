use async_trait::async_trait;
use dnsguard_application::ports::{
    BypassGrantStore, CacheEntry, CacheStats, Clock, ConfigStorePort, Reconfigurable, Resolution,
    ResolverPort, ResponseCachePort, RuleEvaluatorPort, TelemetryPort,
};
use dnsguard_domain::{
    BypassGrant, CachePolicyTable, Config, ConfigSnapshot, Decision, DecisionSource, DnsAnswer,
    DnsQuery, DomainError, GrantId, InterfaceId, RecordType, RuleSet, TelemetryEvent,
    TtlResolution, Verdict,
};
use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, Ordering};
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
// MockRuleEvaluator (also a grant store)
// ============================================================================

pub struct MockRuleEvaluator {
    blocked: Mutex<Vec<String>>,
    rewrites: Mutex<HashMap<String, String>>,
    grants: Mutex<Vec<BypassGrant>>,
    clock: Arc<dyn Clock>,
    rule_count: Mutex<usize>,
    origin: Mutex<Option<Arc<str>>>,
}

impl MockRuleEvaluator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            blocked: Mutex::new(Vec::new()),
            rewrites: Mutex::new(HashMap::new()),
            grants: Mutex::new(Vec::new()),
            clock,
            rule_count: Mutex::new(0),
            origin: Mutex::new(None),
        }
    }

    pub fn block(&self, domain: &str) {
        self.blocked.lock().unwrap().push(domain.to_string());
    }

    pub fn rewrite(&self, domain: &str, target: &str) {
        self.rewrites
            .lock()
            .unwrap()
            .insert(domain.to_string(), target.to_string());
    }

    pub fn grant_count(&self) -> usize {
        self.grants.lock().unwrap().len()
    }
}

impl RuleEvaluatorPort for MockRuleEvaluator {
    fn evaluate(&self, name: &str) -> Verdict {
        let now = self.clock.now();
        if self.grants.lock().unwrap().iter().any(|g| g.allows(name, now)) {
            return Verdict::new(Decision::Allow, DecisionSource::BypassGrant);
        }
        if self.blocked.lock().unwrap().iter().any(|d| d == name) {
            return Verdict::new(
                Decision::Block,
                DecisionSource::Rule {
                    source_id: Arc::from("mock"),
                },
            );
        }
        if let Some(target) = self.rewrites.lock().unwrap().get(name) {
            return Verdict::new(
                Decision::Rewrite(Arc::from(target.as_str())),
                DecisionSource::Rule {
                    source_id: Arc::from("mock"),
                },
            );
        }
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

impl BypassGrantStore for MockRuleEvaluator {
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
// MockResponseCache
// ============================================================================

pub struct MockResponseCache {
    entries: Mutex<HashMap<(String, RecordType), CacheEntry>>,
    policy: Mutex<Arc<CachePolicyTable>>,
    clock: Arc<dyn Clock>,
    pub stores: AtomicU32,
}

impl MockResponseCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(clock, CachePolicyTable::default())
    }

    pub fn with_policy(clock: Arc<dyn Clock>, policy: CachePolicyTable) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            policy: Mutex::new(Arc::new(policy)),
            clock,
            stores: AtomicU32::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn contains(&self, domain: &str, record_type: RecordType) -> bool {
        self.entries
            .lock()
            .unwrap()
            .contains_key(&(domain.to_string(), record_type))
    }
}

impl ResponseCachePort for MockResponseCache {
    fn lookup(&self, query: &DnsQuery) -> Option<CacheEntry> {
        let key = (query.domain.to_string(), query.record_type);
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&key) {
            Some(e) if !e.is_expired(now) => Some(e.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    fn store(&self, query: &DnsQuery, answer: &DnsAnswer) -> TtlResolution {
        let resolution = self.policy.lock().unwrap().resolve(&query.domain);
        if let Some(ttl) = resolution.ttl_secs() {
            let now = self.clock.now();
            self.stores.fetch_add(1, Ordering::Relaxed);
            self.entries.lock().unwrap().insert(
                (query.domain.to_string(), query.record_type),
                CacheEntry {
                    answer: answer.clone(),
                    ttl_secs: ttl,
                    inserted_at: now,
                    expires_at: now + Duration::from_secs(ttl as u64),
                },
            );
        }
        resolution
    }

    fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: true,
            entries: self.len(),
            ..Default::default()
        }
    }

    fn policy(&self) -> Arc<CachePolicyTable> {
        Arc::clone(&self.policy.lock().unwrap())
    }

    fn set_user_ttl(&self, domain: Option<&str>, ttl_secs: u32) -> Result<(), DomainError> {
        let mut policy = self.policy.lock().unwrap();
        let next = policy.with_user_ttl(domain, ttl_secs)?;
        *policy = Arc::new(next);
        Ok(())
    }

    fn add_user_bypass(&self, domain: &str) -> Result<(), DomainError> {
        let mut policy = self.policy.lock().unwrap();
        let next = policy.with_user_bypass(domain)?;
        *policy = Arc::new(next);
        Ok(())
    }

    fn flush(&self) -> Result<usize, DomainError> {
        self.policy.lock().unwrap().ensure_cache_adjustable()?;
        let mut entries = self.entries.lock().unwrap();
        let n = entries.len();
        entries.clear();
        Ok(n)
    }
}

// ============================================================================
// MockResolver
// ============================================================================

/// Replays scripted results in order; answers with 127.0.0.1 once the
/// script runs out.
pub struct MockResolver {
    script: Mutex<VecDeque<Result<DnsAnswer, DomainError>>>,
    delay: Option<Duration>,
    pub calls: AtomicU32,
    pub last_domain: Mutex<Option<String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            delay: None,
            calls: AtomicU32::new(0),
            last_domain: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, result: Result<DnsAnswer, DomainError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn answer(ip: &str) -> DnsAnswer {
    DnsAnswer::new(vec![ip.parse::<IpAddr>().unwrap()])
}

#[async_trait]
impl ResolverPort for MockResolver {
    async fn resolve(
        &self,
        query: &DnsQuery,
        _deadline: Option<Instant>,
    ) -> Result<Resolution, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_domain.lock().unwrap() = Some(query.domain.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(answer("127.0.0.1")));
        next.map(|answer| Resolution {
            answer,
            interface: Some(InterfaceId::new("mock0")),
            attempts: 1,
        })
    }
}

// ============================================================================
// RecordingTelemetry
// ============================================================================

#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

impl TelemetryPort for RecordingTelemetry {
    fn emit(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn is_verbose(&self) -> bool {
        false
    }

    fn dropped(&self) -> u64 {
        0
    }
}

// ============================================================================
// Config store + recording reconfigurable
// ============================================================================

pub struct MemoryConfigStore {
    current: Mutex<ConfigSnapshot>,
}

impl MemoryConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            current: Mutex::new(ConfigSnapshot::new(1, config)),
        }
    }
}

impl ConfigStorePort for MemoryConfigStore {
    fn current(&self) -> ConfigSnapshot {
        self.current.lock().unwrap().clone()
    }

    fn publish(&self, config: Config) -> ConfigSnapshot {
        let mut current = self.current.lock().unwrap();
        let next = current.next(config);
        *current = next.clone();
        next
    }
}

pub struct RecordingComponent {
    pub name: &'static str,
    pub fail: bool,
    pub applied: Mutex<Vec<u64>>,
}

impl RecordingComponent {
    pub fn new(name: &'static str, fail: bool) -> Self {
        Self {
            name,
            fail,
            applied: Mutex::new(Vec::new()),
        }
    }
}

impl Reconfigurable for RecordingComponent {
    fn component(&self) -> &'static str {
        self.name
    }

    fn apply(&self, snapshot: &ConfigSnapshot) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::InvalidConfig(format!("{} refused", self.name)));
        }
        self.applied.lock().unwrap().push(snapshot.version);
        Ok(())
    }
}
