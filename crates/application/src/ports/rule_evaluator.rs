use dnsguard_domain::{BypassGrant, DomainError, GrantId, ManifestDocument, RuleSet, Verdict};
use std::sync::Arc;
use std::time::Instant;

/// Rule evaluation over the active rule set, grants and local lists.
///
/// `evaluate` is synchronous and lock-free on the read side; `replace_*`
/// swap a whole compiled set in one step.
pub trait RuleEvaluatorPort: Send + Sync {
    fn evaluate(&self, name: &str) -> Verdict;

    /// Swaps in `rules`. Returns the number of active rules afterwards.
    fn replace_rules(&self, rules: RuleSet) -> usize;

    /// Validates and compiles `document`, then swaps it in. A rejected
    /// document leaves the current rules untouched.
    fn replace_from_manifest(&self, document: &ManifestDocument) -> Result<usize, DomainError> {
        let rules = document.into_rule_set()?;
        Ok(self.replace_rules(rules))
    }

    fn rule_count(&self) -> usize;

    /// Identifier of the manifest the active rules came from.
    fn origin(&self) -> Option<Arc<str>>;
}

/// Storage for bypass grants consulted by `RuleEvaluatorPort::evaluate`.
pub trait BypassGrantStore: Send + Sync {
    fn insert_grant(&self, grant: BypassGrant);

    fn revoke_grant(&self, id: GrantId) -> Option<BypassGrant>;

    fn active_grants(&self, now: Instant) -> Vec<BypassGrant>;

    /// Drops grants that expired at or before `now`.
    fn purge_expired(&self, now: Instant) -> usize;
}
