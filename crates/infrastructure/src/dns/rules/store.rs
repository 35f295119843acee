use super::local_lists::LocalLists;
use super::rule_index::RuleIndex;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use dnsguard_application::ports::{BypassGrantStore, Clock, Reconfigurable, RuleEvaluatorPort};
use dnsguard_domain::{
    BypassGrant, ConfigSnapshot, Decision, DecisionSource, DomainError, GrantId, RuleSet, Verdict,
};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Everything `evaluate` reads, compiled together and swapped as one value.
struct CompiledRules {
    manifest: Arc<RuleSet>,
    local: Arc<LocalLists>,
    /// Manifest rules followed by local block entries.
    index: RuleIndex,
    whitelist: RuleIndex,
}

impl CompiledRules {
    fn build(manifest: Arc<RuleSet>, local: Arc<LocalLists>) -> Self {
        let mut rules = Vec::with_capacity(manifest.len() + local.block.len());
        rules.extend(manifest.rules.iter().cloned());
        rules.extend(local.block.iter().cloned());

        Self {
            index: RuleIndex::compile(rules),
            whitelist: RuleIndex::compile(local.whitelist.clone()),
            manifest,
            local,
        }
    }
}

/// The rule store.
///
/// Rules, local lists and the whitelist are compiled into one immutable
/// value held in an `ArcSwap`; `evaluate` takes a lock-free snapshot and
/// never waits on a replacement in progress. Bypass grants live beside it
/// in a sharded map so they take effect immediately.
///
/// Evaluation order:
///   1. Active bypass grant        → Allow
///   2. Local whitelist            → Allow
///   3. Best matching rule         → its action
///   4. Nothing matched            → Allow
pub struct RuleStore {
    compiled: ArcSwap<CompiledRules>,
    grants: DashMap<GrantId, BypassGrant, FxBuildHasher>,
    clock: Arc<dyn Clock>,
}

impl RuleStore {
    pub fn new(local: LocalLists, clock: Arc<dyn Clock>) -> Self {
        let compiled = CompiledRules::build(Arc::new(RuleSet::default()), Arc::new(local));
        Self {
            compiled: ArcSwap::from_pointee(compiled),
            grants: DashMap::with_hasher(FxBuildHasher),
            clock,
        }
    }

    /// Replaces the local block and whitelist entries, keeping manifest rules.
    pub fn replace_local(&self, local: LocalLists) {
        let local = Arc::new(local);
        self.compiled
            .rcu(|current| CompiledRules::build(Arc::clone(&current.manifest), Arc::clone(&local)));
        info!(
            blocked = local.block.len(),
            whitelisted = local.whitelist.len(),
            enabled = local.enabled,
            "Local lists replaced"
        );
    }

    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }

    #[inline]
    fn granted(&self, name: &str, now: Instant) -> bool {
        !self.grants.is_empty() && self.grants.iter().any(|g| g.allows(name, now))
    }
}

impl RuleEvaluatorPort for RuleStore {
    fn evaluate(&self, name: &str) -> Verdict {
        if self.granted(name, self.clock.now()) {
            return Verdict::new(Decision::Allow, DecisionSource::BypassGrant);
        }

        let compiled = self.compiled.load();

        if !compiled.local.enabled {
            return Verdict::default_allow();
        }

        if compiled.whitelist.matches(name) {
            return Verdict::new(Decision::Allow, DecisionSource::Whitelist);
        }

        match compiled.index.best_match(name) {
            Some(rule) => {
                debug!(domain = name, source = %rule.source_id, "Rule matched");
                Verdict::new(
                    rule.action.to_decision(),
                    DecisionSource::Rule {
                        source_id: Arc::clone(&rule.source_id),
                    },
                )
            }
            None => Verdict::default_allow(),
        }
    }

    fn replace_rules(&self, rules: RuleSet) -> usize {
        let manifest = Arc::new(rules);
        self.compiled
            .rcu(|current| CompiledRules::build(Arc::clone(&manifest), Arc::clone(&current.local)));
        let count = self.compiled.load().index.len();
        info!(rules = count, origin = ?manifest.origin, "Rule set swapped");
        count
    }

    fn rule_count(&self) -> usize {
        self.compiled.load().index.len()
    }

    fn origin(&self) -> Option<Arc<str>> {
        self.compiled.load().manifest.origin.clone()
    }
}

impl BypassGrantStore for RuleStore {
    fn insert_grant(&self, grant: BypassGrant) {
        self.grants.insert(grant.id, grant);
    }

    fn revoke_grant(&self, id: GrantId) -> Option<BypassGrant> {
        self.grants.remove(&id).map(|(_, g)| g)
    }

    fn active_grants(&self, now: Instant) -> Vec<BypassGrant> {
        let mut grants: Vec<BypassGrant> = self
            .grants
            .iter()
            .filter(|g| g.is_active(now))
            .map(|g| g.value().clone())
            .collect();
        grants.sort_by_key(|g| g.id);
        grants
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let before = self.grants.len();
        self.grants.retain(|_, g| g.is_active(now));
        before.saturating_sub(self.grants.len())
    }
}

impl Reconfigurable for RuleStore {
    fn component(&self) -> &'static str {
        "rules"
    }

    fn apply(&self, snapshot: &ConfigSnapshot) -> Result<(), DomainError> {
        let local = LocalLists::from_config(&snapshot.config.blocking)?;
        self.replace_local(local);
        Ok(())
    }
}
