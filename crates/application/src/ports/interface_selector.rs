use dnsguard_domain::{DomainError, DnsQuery, InterfaceId, NetworkInterface, TransactionId};

/// Interface choice state for one resolution transaction.
///
/// Owned by the resolving task and dropped with it. Nothing about a
/// transaction's pinning is kept in shared state.
#[derive(Debug, Clone)]
pub struct TransactionBinding {
    pub transaction_id: TransactionId,
    sticky: bool,
    pinned: Option<NetworkInterface>,
}

impl TransactionBinding {
    pub fn new(transaction_id: TransactionId, sticky: bool) -> Self {
        Self {
            transaction_id,
            sticky,
            pinned: None,
        }
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    pub fn pinned(&self) -> Option<&NetworkInterface> {
        self.pinned.as_ref()
    }

    pub fn pinned_id(&self) -> Option<&InterfaceId> {
        self.pinned.as_ref().map(|i| &i.id)
    }

    /// Records the first interface tried. Later calls are ignored.
    pub fn pin(&mut self, interface: &NetworkInterface) {
        if self.sticky && self.pinned.is_none() {
            self.pinned = Some(interface.clone());
        }
    }
}

/// Picks the interface for one resolution attempt.
pub trait InterfaceSelectorPort: Send + Sync {
    /// Returns the pinned interface when the binding is sticky and already
    /// pinned, otherwise consults the strategy (and pins the result when
    /// sticky).
    fn select(
        &self,
        query: &DnsQuery,
        binding: &mut TransactionBinding,
    ) -> Result<NetworkInterface, DomainError>;

    /// Whether new transactions should be sticky.
    fn sticky_by_default(&self) -> bool;
}
