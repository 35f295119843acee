use super::Strategy;
use arc_swap::ArcSwap;
use dnsguard_application::ports::{InterfaceSelectorPort, Reconfigurable, TransactionBinding};
use dnsguard_domain::config::InterfacesConfig;
use dnsguard_domain::{
    ConfigSnapshot, DnsQuery, DomainError, InterfaceId, InterfaceStrategy, NetworkInterface,
};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

struct SelectorState {
    interfaces: Vec<NetworkInterface>,
    strategy: Arc<Strategy>,
    sticky: bool,
}

/// Chooses the interface for each resolution attempt.
///
/// Holds no per-transaction data: stickiness is carried by the caller's
/// [`TransactionBinding`]. The only shared mutable state is the
/// round-robin counter inside the strategy.
pub struct InterfaceSelector {
    state: ArcSwap<SelectorState>,
}

impl InterfaceSelector {
    pub fn new(
        interfaces: Vec<NetworkInterface>,
        strategy: Strategy,
        sticky: bool,
    ) -> Self {
        Self::from_state(SelectorState {
            interfaces,
            strategy: Arc::new(strategy),
            sticky,
        })
    }

    pub fn from_config(config: &InterfacesConfig) -> Result<Self, DomainError> {
        state_from_config(config).map(Self::from_state)
    }

    fn from_state(state: SelectorState) -> Self {
        info!(
            interfaces = state.interfaces.len(),
            strategy = state.strategy.kind().as_str(),
            sticky = state.sticky,
            "Interface selector ready"
        );
        Self {
            state: ArcSwap::from_pointee(state),
        }
    }

    pub fn interfaces(&self) -> Vec<NetworkInterface> {
        self.state.load().interfaces.clone()
    }

    pub fn strategy(&self) -> InterfaceStrategy {
        self.state.load().strategy.kind()
    }

    /// Marks an interface up or down (e.g. on a network change event).
    ///
    /// The strategy is shared with the previous state, so round-robin
    /// position carries over.
    pub fn set_available(&self, id: &InterfaceId, available: bool) {
        self.state.rcu(|current| SelectorState {
            interfaces: current
                .interfaces
                .iter()
                .map(|i| {
                    let mut i = i.clone();
                    if &i.id == id {
                        i.available = available;
                    }
                    i
                })
                .collect(),
            strategy: Arc::clone(&current.strategy),
            sticky: current.sticky,
        });
        debug!(interface = %id, available, "Interface availability changed");
    }
}

fn state_from_config(config: &InterfacesConfig) -> Result<SelectorState, DomainError> {
    let invalid = |e: dnsguard_domain::ConfigError| DomainError::InvalidConfig(e.to_string());
    let interfaces = config.network_interfaces().map_err(invalid)?;
    let vpn_domains = config.vpn_domains().map_err(invalid)?;
    let preferred = config.preferred.iter().map(|p| InterfaceId::new(p)).collect();

    Ok(SelectorState {
        interfaces,
        strategy: Arc::new(Strategy::build(config.strategy, preferred, vpn_domains)),
        sticky: config.sticky_per_transaction,
    })
}

impl InterfaceSelectorPort for InterfaceSelector {
    fn select(
        &self,
        query: &DnsQuery,
        binding: &mut TransactionBinding,
    ) -> Result<NetworkInterface, DomainError> {
        if binding.is_sticky() {
            if let Some(pinned) = binding.pinned() {
                return Ok(pinned.clone());
            }
        }

        let state = self.state.load();
        let available: SmallVec<[&NetworkInterface; 4]> =
            state.interfaces.iter().filter(|i| i.available).collect();

        let chosen = state
            .strategy
            .pick(&query.domain, &available)
            .ok_or(DomainError::NoInterfaceAvailable)?
            .clone();

        binding.pin(&chosen);
        Ok(chosen)
    }

    fn sticky_by_default(&self) -> bool {
        self.state.load().sticky
    }
}

impl Reconfigurable for InterfaceSelector {
    fn component(&self) -> &'static str {
        "interfaces"
    }

    fn apply(&self, snapshot: &ConfigSnapshot) -> Result<(), DomainError> {
        let state = state_from_config(&snapshot.config.interfaces)?;
        info!(
            interfaces = state.interfaces.len(),
            strategy = state.strategy.kind().as_str(),
            "Interface selector reconfigured"
        );
        self.state.store(Arc::new(state));
        Ok(())
    }
}
