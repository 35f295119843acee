use arc_swap::ArcSwap;
use dnsguard_application::ports::ConfigStorePort;
use dnsguard_domain::{Config, ConfigSnapshot};
use std::sync::Arc;
use tracing::info;

/// Current configuration snapshot behind an `ArcSwap`.
pub struct ConfigStore {
    current: ArcSwap<ConfigSnapshot>,
}

impl ConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            current: ArcSwap::from_pointee(ConfigSnapshot::new(1, config)),
        }
    }
}

impl ConfigStorePort for ConfigStore {
    fn current(&self) -> ConfigSnapshot {
        self.current.load().as_ref().clone()
    }

    fn publish(&self, config: Config) -> ConfigSnapshot {
        let mut published = None;
        self.current.rcu(|current| {
            let next = current.next(config.clone());
            published = Some(next.clone());
            next
        });
        let snapshot = published.unwrap_or_else(|| self.current());
        info!(version = snapshot.version, "Configuration published");
        snapshot
    }
}
