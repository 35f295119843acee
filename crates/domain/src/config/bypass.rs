use serde::{Deserialize, Serialize};

/// Bypass control channel credentials and limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BypassConfig {
    /// Operator password. Unset disables password authentication.
    #[serde(default)]
    pub password: Option<String>,

    /// Control channel token. Unset disables token authentication.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Consecutive failures before an identity is locked out
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,

    /// Failures across all callers before every caller is locked out
    #[serde(default = "default_max_failed_attempts_total")]
    pub max_failed_attempts_total: u32,

    /// Lockout duration in seconds; also the window a failure is remembered
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,

    /// Grant lifetime when the request does not name one
    #[serde(default = "default_grant_secs")]
    pub default_grant_secs: u64,

    /// Upper bound for any grant lifetime
    #[serde(default = "default_max_grant_secs")]
    pub max_grant_secs: u64,
}

fn default_max_failed_attempts() -> u32 {
    5
}

fn default_max_failed_attempts_total() -> u32 {
    20
}

fn default_lockout_secs() -> u64 {
    300
}

fn default_grant_secs() -> u64 {
    600
}

fn default_max_grant_secs() -> u64 {
    3600
}

impl Default for BypassConfig {
    fn default() -> Self {
        Self {
            password: None,
            auth_token: None,
            max_failed_attempts: default_max_failed_attempts(),
            max_failed_attempts_total: default_max_failed_attempts_total(),
            lockout_secs: default_lockout_secs(),
            default_grant_secs: default_grant_secs(),
            max_grant_secs: default_max_grant_secs(),
        }
    }
}

impl BypassConfig {
    pub fn has_credentials(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
            || self.auth_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
