use crate::validators::{label_count, matches_suffix, validate_domain_name};
use crate::{Decision, DomainError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// How a rule pattern is compared against a query name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "match", content = "domain", rename_all = "lowercase")]
pub enum RulePattern {
    /// Name must equal the pattern.
    Exact(Arc<str>),
    /// Name must equal the pattern or end with `.pattern`.
    Suffix(Arc<str>),
}

impl RulePattern {
    pub fn exact(domain: &str) -> Result<Self, DomainError> {
        Ok(Self::Exact(Arc::from(validate_domain_name(domain)?)))
    }

    pub fn suffix(domain: &str) -> Result<Self, DomainError> {
        Ok(Self::Suffix(Arc::from(validate_domain_name(domain)?)))
    }

    /// Parses the list notation used by local block/whitelists.
    ///
    /// `example.com`, `.example.com` and `*.example.com` all cover the apex and
    /// every subdomain; `=example.com` matches the apex only.
    pub fn parse_list_entry(entry: &str) -> Result<Self, DomainError> {
        let entry = entry.trim();
        if let Some(rest) = entry.strip_prefix("*.") {
            return Self::suffix(rest);
        }
        if let Some(rest) = entry.strip_prefix('=') {
            return Self::exact(rest);
        }
        Self::suffix(entry.trim_start_matches('.'))
    }

    pub fn domain(&self) -> &str {
        match self {
            Self::Exact(d) | Self::Suffix(d) => d,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(d) => &**d == name,
            Self::Suffix(d) => matches_suffix(d, name),
        }
    }

    /// Higher is more specific. Exact beats suffix on the same label count.
    pub fn specificity(&self) -> (usize, u8) {
        match self {
            Self::Exact(d) => (label_count(d), 1),
            Self::Suffix(d) => (label_count(d), 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "lowercase")]
pub enum RuleAction {
    Block,
    Allow,
    Rewrite(Arc<str>),
}

impl RuleAction {
    pub fn to_decision(&self) -> Decision {
        match self {
            RuleAction::Block => Decision::Block,
            RuleAction::Allow => Decision::Allow,
            RuleAction::Rewrite(target) => Decision::Rewrite(Arc::clone(target)),
        }
    }
}

/// One compiled filtering rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: RulePattern,
    pub action: RuleAction,
    pub source_id: Arc<str>,
    pub priority: i32,
}

impl Rule {
    pub fn new(pattern: RulePattern, action: RuleAction, source_id: &str, priority: i32) -> Self {
        Self {
            pattern,
            action,
            source_id: Arc::from(source_id),
            priority,
        }
    }

    /// Deterministic precedence: priority, then specificity. Ties are broken by
    /// the caller using insertion order.
    pub fn precedence_cmp(&self, other: &Rule) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.pattern.specificity().cmp(&other.pattern.specificity()))
    }
}

/// An immutable, validated collection of rules.
///
/// Replaced wholesale on manifest refresh; never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Manifest identifier and format version the set was built from.
    pub origin: Option<Arc<str>>,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            origin: None,
            rules,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<Arc<str>>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Linear reference evaluation. The compiled index in the rule store must
    /// agree with this for every name.
    pub fn best_match(&self, name: &str) -> Option<&Rule> {
        let mut best: Option<&Rule> = None;
        for rule in self.rules.iter().filter(|r| r.pattern.matches(name)) {
            best = match best {
                Some(current) if rule.precedence_cmp(current) != Ordering::Greater => Some(current),
                _ => Some(rule),
            };
        }
        best
    }
}
