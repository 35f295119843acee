use dnsguard_domain::validators::matches_suffix;
use dnsguard_domain::{InterfaceId, InterfaceStrategy, NetworkInterface};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Rotates through available interfaces with a shared atomic counter.
#[derive(Debug, Default)]
pub struct RoundRobinStrategy {
    next: AtomicUsize,
}

impl RoundRobinStrategy {
    fn pick<'a>(&self, available: &[&'a NetworkInterface]) -> Option<&'a NetworkInterface> {
        if available.is_empty() {
            return None;
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % available.len();
        Some(available[idx])
    }
}

/// Walks a configured preference list; the first available entry wins.
/// Interfaces not on the list come after it, in declaration order.
#[derive(Debug, Default)]
pub struct PreferredFirstStrategy {
    order: Vec<InterfaceId>,
}

impl PreferredFirstStrategy {
    pub fn new(order: Vec<InterfaceId>) -> Self {
        Self { order }
    }

    fn pick<'a>(&self, available: &[&'a NetworkInterface]) -> Option<&'a NetworkInterface> {
        self.order
            .iter()
            .find_map(|id| available.iter().find(|i| &i.id == id).copied())
            .or_else(|| available.first().copied())
    }
}

/// Sends names under a VPN resolver domain over a VPN interface and the
/// rest over a physical one, falling back to anything available.
#[derive(Debug, Default)]
pub struct VpnAwareStrategy {
    vpn_domains: Vec<String>,
}

impl VpnAwareStrategy {
    pub fn new(vpn_domains: Vec<String>) -> Self {
        Self { vpn_domains }
    }

    pub fn wants_vpn(&self, name: &str) -> bool {
        self.vpn_domains.iter().any(|d| matches_suffix(d, name))
    }

    fn pick<'a>(
        &self,
        name: &str,
        available: &[&'a NetworkInterface],
    ) -> Option<&'a NetworkInterface> {
        let want_vpn = self.wants_vpn(name);
        available
            .iter()
            .find(|i| i.is_vpn() == want_vpn)
            .or_else(|| available.first())
            .copied()
    }
}

/// Stack-allocated enum dispatch for interface selection strategies.
#[derive(Debug)]
pub enum Strategy {
    RoundRobin(RoundRobinStrategy),
    PreferredFirst(PreferredFirstStrategy),
    VpnAware(VpnAwareStrategy),
}

impl Strategy {
    pub fn build(kind: InterfaceStrategy, preferred: Vec<InterfaceId>, vpn_domains: Vec<String>) -> Self {
        match kind {
            InterfaceStrategy::RoundRobin => Self::RoundRobin(RoundRobinStrategy::default()),
            InterfaceStrategy::PreferredFirst => {
                Self::PreferredFirst(PreferredFirstStrategy::new(preferred))
            }
            InterfaceStrategy::VpnAware => Self::VpnAware(VpnAwareStrategy::new(vpn_domains)),
        }
    }

    pub fn kind(&self) -> InterfaceStrategy {
        match self {
            Self::RoundRobin(_) => InterfaceStrategy::RoundRobin,
            Self::PreferredFirst(_) => InterfaceStrategy::PreferredFirst,
            Self::VpnAware(_) => InterfaceStrategy::VpnAware,
        }
    }

    pub fn pick<'a>(
        &self,
        name: &str,
        available: &[&'a NetworkInterface],
    ) -> Option<&'a NetworkInterface> {
        match self {
            Self::RoundRobin(s) => s.pick(available),
            Self::PreferredFirst(s) => s.pick(available),
            Self::VpnAware(s) => s.pick(name, available),
        }
    }
}
