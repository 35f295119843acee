use serde::{Deserialize, Serialize};

/// Local domain filtering on top of manifest rules
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockingConfig {
    /// Enable blocking (default: true). When off every query is allowed.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Domains blocked locally, in addition to manifest rules.
    /// `example.com` covers subdomains, `=example.com` only the apex.
    #[serde(default)]
    pub blocked_domains: Vec<String>,

    /// Domains always allowed, even when a rule blocks them
    #[serde(default)]
    pub whitelisted_domains: Vec<String>,

    /// Priority given to local block entries when ranked against manifest rules
    #[serde(default = "default_local_priority")]
    pub local_priority: i32,
}

fn default_true() -> bool {
    true
}

fn default_local_priority() -> i32 {
    100
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blocked_domains: vec![],
            whitelisted_domains: vec![],
            local_priority: default_local_priority(),
        }
    }
}
