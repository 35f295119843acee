use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Change not permitted by managed policy: {0}")]
    PolicyLocked(String),

    #[error("Manifest rejected: {0}")]
    ManifestRejected(String),

    #[error("Resolution timed out after {attempts} attempt(s)")]
    ResolutionTimeout { attempts: u32 },

    #[error("Upstream unreachable after {attempts} attempt(s): {reason}")]
    ResolutionUnreachable { attempts: u32, reason: String },

    #[error("Query deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Cache capacity of {0} entries exceeded")]
    CacheCapacityExceeded(usize),

    #[error("No network interface available")]
    NoInterfaceAvailable,

    #[error("Bypass grant not found: {0}")]
    GrantNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Transport unreachable ({server}): {reason}")]
    TransportUnreachable { server: String, reason: String },

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DomainError {
    /// Transport-level failures that the resolver retries before giving up.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::TransportTimeout { .. }
                | DomainError::TransportUnreachable { .. }
                | DomainError::IoError(_)
        )
    }

    /// Terminal errors produced once the retry budget is spent.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            DomainError::ResolutionTimeout { .. }
                | DomainError::ResolutionUnreachable { .. }
                | DomainError::DeadlineExceeded(_)
                | DomainError::NoInterfaceAvailable
        )
    }
}
