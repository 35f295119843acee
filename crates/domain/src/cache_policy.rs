use crate::validators::{label_count, matches_suffix, validate_domain_name};
use crate::DomainError;
use serde::{Deserialize, Serialize};

/// TTL used when neither an override nor a configured default applies.
pub const FALLBACK_TTL_SECS: u32 = 300;

/// Per-domain cache override.
///
/// `domain` matches the name itself and every subdomain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    pub domain: String,

    /// TTL override in seconds. `None` keeps the table default.
    #[serde(default)]
    pub ttl: Option<u32>,

    #[serde(default = "default_true")]
    pub cacheable: bool,
}

/// How long to keep an answer, or why not to keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlResolution {
    Cache { ttl_secs: u32 },
    CachingDisabled,
    Bypassed,
    NotCacheable,
}

impl TtlResolution {
    pub fn ttl_secs(&self) -> Option<u32> {
        match self {
            TtlResolution::Cache { ttl_secs } => Some(*ttl_secs),
            _ => None,
        }
    }
}

/// Immutable cache policy snapshot.
///
/// Runtime changes never mutate a table; they produce a new one (or a
/// `PolicyLocked` error) which the owner swaps in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicyTable {
    enabled: bool,
    default_ttl: Option<u32>,
    overrides: Vec<CachePolicy>,
    bypass: Vec<String>,
    user_can_adjust_ttl: bool,
    user_can_adjust_cache: bool,
}

impl Default for CachePolicyTable {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: None,
            overrides: Vec::new(),
            bypass: Vec::new(),
            user_can_adjust_ttl: true,
            user_can_adjust_cache: true,
        }
    }
}

impl CachePolicyTable {
    pub fn new(enabled: bool, default_ttl: Option<u32>) -> Self {
        Self {
            enabled,
            default_ttl,
            ..Self::default()
        }
    }

    /// Normalizes and appends overrides. Invalid domains are an error.
    pub fn with_overrides(mut self, overrides: Vec<CachePolicy>) -> Result<Self, DomainError> {
        for mut policy in overrides {
            policy.domain = validate_domain_name(&policy.domain)?;
            self.overrides.push(policy);
        }
        Ok(self)
    }

    pub fn with_bypass_domains(mut self, domains: Vec<String>) -> Result<Self, DomainError> {
        for domain in domains {
            self.bypass.push(validate_domain_name(&domain)?);
        }
        Ok(self)
    }

    pub fn with_user_permissions(mut self, adjust_ttl: bool, adjust_cache: bool) -> Self {
        self.user_can_adjust_ttl = adjust_ttl;
        self.user_can_adjust_cache = adjust_cache;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn effective_default_ttl(&self) -> u32 {
        self.default_ttl.unwrap_or(FALLBACK_TTL_SECS)
    }

    pub fn overrides(&self) -> &[CachePolicy] {
        &self.overrides
    }

    pub fn bypass_domains(&self) -> &[String] {
        &self.bypass
    }

    pub fn user_can_adjust_ttl(&self) -> bool {
        self.user_can_adjust_ttl
    }

    pub fn user_can_adjust_cache(&self) -> bool {
        self.user_can_adjust_cache
    }

    pub fn is_bypassed(&self, name: &str) -> bool {
        self.bypass.iter().any(|d| matches_suffix(d, name))
    }

    /// Most specific override for `name`; first listed wins on equal specificity.
    pub fn matching_override(&self, name: &str) -> Option<&CachePolicy> {
        let mut best: Option<&CachePolicy> = None;
        for policy in self.overrides.iter().filter(|p| matches_suffix(&p.domain, name)) {
            match best {
                Some(current) if label_count(&current.domain) >= label_count(&policy.domain) => {}
                _ => best = Some(policy),
            }
        }
        best
    }

    /// Resolution order: global switch, bypass set, most specific override,
    /// table default, hardcoded fallback.
    pub fn resolve(&self, name: &str) -> TtlResolution {
        if !self.enabled {
            return TtlResolution::CachingDisabled;
        }
        if self.is_bypassed(name) {
            return TtlResolution::Bypassed;
        }
        match self.matching_override(name) {
            Some(policy) if !policy.cacheable || policy.ttl == Some(0) => {
                TtlResolution::NotCacheable
            }
            Some(CachePolicy { ttl: Some(ttl), .. }) => TtlResolution::Cache { ttl_secs: *ttl },
            _ => TtlResolution::Cache {
                ttl_secs: self.effective_default_ttl(),
            },
        }
    }

    // ------------------------------------------------------------------
    // User-initiated changes
    // ------------------------------------------------------------------

    pub fn ensure_ttl_adjustable(&self) -> Result<(), DomainError> {
        if self.user_can_adjust_ttl {
            Ok(())
        } else {
            Err(DomainError::PolicyLocked(
                "cache TTL is managed and cannot be changed locally".to_string(),
            ))
        }
    }

    pub fn ensure_cache_adjustable(&self) -> Result<(), DomainError> {
        if self.user_can_adjust_cache {
            Ok(())
        } else {
            Err(DomainError::PolicyLocked(
                "cache behaviour is managed and cannot be changed locally".to_string(),
            ))
        }
    }

    /// New table with a different default TTL, or `domain`-scoped TTL when given.
    pub fn with_user_ttl(&self, domain: Option<&str>, ttl_secs: u32) -> Result<Self, DomainError> {
        self.ensure_ttl_adjustable()?;
        let mut next = self.clone();
        match domain {
            None => next.default_ttl = Some(ttl_secs),
            Some(domain) => {
                let domain = validate_domain_name(domain)?;
                next.overrides.retain(|p| p.domain != domain);
                next.overrides.push(CachePolicy {
                    domain,
                    ttl: Some(ttl_secs),
                    cacheable: true,
                });
            }
        }
        Ok(next)
    }

    /// New table with `domain` added to the bypass set.
    pub fn with_user_bypass(&self, domain: &str) -> Result<Self, DomainError> {
        self.ensure_cache_adjustable()?;
        let domain = validate_domain_name(domain)?;
        let mut next = self.clone();
        if !next.bypass.contains(&domain) {
            next.bypass.push(domain);
        }
        Ok(next)
    }
}

fn default_true() -> bool {
    true
}
