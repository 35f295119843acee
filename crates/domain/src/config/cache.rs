use super::ConfigError;
use crate::{CachePolicy, CachePolicyTable};
use serde::{Deserialize, Serialize};

/// Response cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Master switch for the response cache (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Default TTL in seconds. Unset falls back to 300.
    #[serde(default)]
    pub default_ttl: Option<u32>,

    /// Per-domain TTL overrides; most specific match wins
    #[serde(default)]
    pub domain_rules: Vec<CachePolicy>,

    /// Domains that are never cached
    #[serde(default)]
    pub bypass_domains: Vec<String>,

    /// Whether the local user may change TTLs at runtime
    #[serde(default = "default_true")]
    pub user_can_adjust_ttl: bool,

    /// Whether the local user may flush or change bypass domains at runtime
    #[serde(default = "default_true")]
    pub user_can_adjust_cache: bool,

    /// Capacity ceiling; oldest insertions are evicted beyond it
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Expired-entry sweep interval in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_entries() -> usize {
    10_000
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: None,
            domain_rules: vec![],
            bypass_domains: vec![],
            user_can_adjust_ttl: true,
            user_can_adjust_cache: true,
            max_entries: default_max_entries(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl CacheConfig {
    pub fn policy_table(&self) -> Result<CachePolicyTable, ConfigError> {
        CachePolicyTable::new(self.enabled, self.default_ttl)
            .with_overrides(self.domain_rules.clone())
            .and_then(|t| t.with_bypass_domains(self.bypass_domains.clone()))
            .map(|t| t.with_user_permissions(self.user_can_adjust_ttl, self.user_can_adjust_cache))
            .map_err(|e| ConfigError::invalid("cache", e.to_string()))
    }
}
