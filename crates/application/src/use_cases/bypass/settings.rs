use dnsguard_domain::config::BypassConfig;
use dnsguard_domain::CredentialKind;
use sha2::{Digest, Sha256};
use std::time::Duration;
use subtle::ConstantTimeEq;

/// Credential digests and limits for the bypass control channel.
///
/// Only SHA-256 digests of the configured secrets are kept; presented
/// credentials are hashed and compared in constant time.
#[derive(Clone)]
pub struct BypassSettings {
    password_digest: Option<[u8; 32]>,
    token_digest: Option<[u8; 32]>,
    pub max_failed_attempts: u32,
    pub max_failed_total: u32,
    pub lockout: Duration,
    pub default_grant: Duration,
    pub max_grant: Duration,
}

impl BypassSettings {
    pub fn from_config(config: &BypassConfig) -> Self {
        Self {
            password_digest: config.password.as_deref().filter(|p| !p.is_empty()).map(digest),
            token_digest: config.auth_token.as_deref().filter(|t| !t.is_empty()).map(digest),
            max_failed_attempts: config.max_failed_attempts.max(1),
            max_failed_total: config.max_failed_attempts_total.max(1),
            lockout: Duration::from_secs(config.lockout_secs),
            default_grant: Duration::from_secs(config.default_grant_secs),
            max_grant: Duration::from_secs(config.max_grant_secs),
        }
    }

    /// Which configured credential `presented` matches, if any.
    ///
    /// Both digests are always compared so the time taken does not reveal
    /// which kinds are configured.
    pub fn verify(&self, presented: &str) -> Option<CredentialKind> {
        let presented = digest(presented);
        let password = matches(&self.password_digest, &presented);
        let token = matches(&self.token_digest, &presented);

        if password {
            Some(CredentialKind::Password)
        } else if token {
            Some(CredentialKind::Token)
        } else {
            None
        }
    }

    /// Whether `presented` is the control token specifically.
    pub fn verify_token(&self, presented: &str) -> bool {
        matches(&self.token_digest, &digest(presented))
    }

    pub fn has_credentials(&self) -> bool {
        self.password_digest.is_some() || self.token_digest.is_some()
    }

    /// Requested TTL bounded by `max_grant`; zero or absent means the default.
    pub fn clamp_ttl(&self, requested: Option<Duration>) -> Duration {
        requested
            .filter(|d| !d.is_zero())
            .unwrap_or(self.default_grant)
            .min(self.max_grant)
    }
}

impl std::fmt::Debug for BypassSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BypassSettings")
            .field("password", &self.password_digest.is_some())
            .field("token", &self.token_digest.is_some())
            .field("max_failed_attempts", &self.max_failed_attempts)
            .field("max_failed_total", &self.max_failed_total)
            .field("lockout", &self.lockout)
            .field("max_grant", &self.max_grant)
            .finish()
    }
}

fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

fn matches(expected: &Option<[u8; 32]>, presented: &[u8; 32]) -> bool {
    match expected {
        Some(expected) => bool::from(expected.ct_eq(presented)),
        None => {
            // Same work on the unconfigured path.
            let _ = [0u8; 32].ct_eq(presented);
            false
        }
    }
}
