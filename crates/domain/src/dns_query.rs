use super::RecordType;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Identifier shared by every attempt that belongs to one client query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// DNS query (domain + record type) as received from the platform shim.
///
/// Immutable once built. Uses `Arc<str>` so the name can be handed to the
/// rule store, cache and telemetry without copying.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub domain: Arc<str>,
    pub record_type: RecordType,
    pub transaction_id: TransactionId,
    pub received_at: Instant,
}

impl DnsQuery {
    /// Builds a query, normalizing the name (lower-case, no trailing dot).
    pub fn new(
        domain: impl AsRef<str>,
        record_type: RecordType,
        transaction_id: TransactionId,
    ) -> Self {
        Self {
            domain: Arc::from(crate::validators::normalize_domain(domain.as_ref())),
            record_type,
            transaction_id,
            received_at: Instant::now(),
        }
    }

    pub fn with_received_at(mut self, received_at: Instant) -> Self {
        self.received_at = received_at;
        self
    }

    /// Same transaction, different name. Used when a rewrite rule redirects the query.
    pub fn retarget(&self, target: &str) -> Self {
        Self {
            domain: Arc::from(crate::validators::normalize_domain(target)),
            record_type: self.record_type,
            transaction_id: self.transaction_id,
            received_at: self.received_at,
        }
    }
}
