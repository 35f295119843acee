use dnsguard_domain::{Config, ConfigSnapshot, DomainError};

/// Holder of the current configuration snapshot.
pub trait ConfigStorePort: Send + Sync {
    fn current(&self) -> ConfigSnapshot;

    /// Publishes `config` as the next version and returns it.
    fn publish(&self, config: Config) -> ConfigSnapshot;
}

/// A component that re-reads its settings from a new snapshot.
///
/// Implementations swap their state atomically; an error leaves the
/// previous settings in force.
pub trait Reconfigurable: Send + Sync {
    fn component(&self) -> &'static str;

    fn apply(&self, snapshot: &ConfigSnapshot) -> Result<(), DomainError>;
}
