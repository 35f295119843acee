use dnsguard_domain::{BypassGrant, BypassScope};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Deserialize, Debug, Clone)]
pub struct BypassRequest {
    pub credential: String,
    /// Domain to unblock; omitted means every name.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

#[derive(Serialize, Debug, Clone)]
pub struct GrantResponse {
    pub id: String,
    pub scope: String,
    pub remaining_secs: u64,
    pub credential: &'static str,
}

impl GrantResponse {
    pub fn from_grant(grant: &BypassGrant, remaining: Duration) -> Self {
        let scope = match &grant.scope {
            BypassScope::All => "*".to_string(),
            BypassScope::Domain(domain) => domain.to_string(),
        };
        Self {
            id: grant.id.to_string(),
            scope,
            remaining_secs: remaining.as_secs(),
            credential: grant.credential.as_str(),
        }
    }
}
