use crate::validators::{matches_suffix, validate_domain_name};
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrantId(pub u64);

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g-{:08x}", self.0)
    }
}

impl std::str::FromStr for GrantId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("g-")
            .and_then(|hex| u64::from_str_radix(hex, 16).ok())
            .map(GrantId)
            .ok_or_else(|| DomainError::GrantNotFound(s.to_string()))
    }
}

/// What a grant unblocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BypassScope {
    /// Every name. Blocking is effectively off while the grant lives.
    All,
    /// The domain and all of its subdomains.
    Domain(Arc<str>),
}

impl BypassScope {
    pub fn domain(name: &str) -> Result<Self, DomainError> {
        Ok(Self::Domain(Arc::from(validate_domain_name(name)?)))
    }

    pub fn covers(&self, name: &str) -> bool {
        match self {
            BypassScope::All => true,
            BypassScope::Domain(domain) => matches_suffix(domain, name),
        }
    }
}

impl fmt::Display for BypassScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassScope::All => f.write_str("*"),
            BypassScope::Domain(d) => f.write_str(d),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Password,
    Token,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Password => "password",
            CredentialKind::Token => "token",
        }
    }
}

/// A time-bounded allow override issued after successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassGrant {
    pub id: GrantId,
    pub scope: BypassScope,
    pub issued_at: Instant,
    pub expires_at: Instant,
    pub credential: CredentialKind,
}

impl BypassGrant {
    pub fn new(
        id: GrantId,
        scope: BypassScope,
        issued_at: Instant,
        ttl: Duration,
        credential: CredentialKind,
    ) -> Self {
        Self {
            id,
            scope,
            issued_at,
            expires_at: issued_at + ttl,
            credential,
        }
    }

    #[inline]
    pub fn is_active(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    /// Active and covering `name`.
    #[inline]
    pub fn allows(&self, name: &str, now: Instant) -> bool {
        self.is_active(now) && self.scope.covers(name)
    }
}
