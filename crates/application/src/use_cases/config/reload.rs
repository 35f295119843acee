use crate::ports::{ConfigStorePort, Reconfigurable};
use dnsguard_domain::{Config, ConfigSnapshot, DomainError};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Validates a new configuration, publishes it and re-applies it to every
/// registered component.
pub struct ReloadConfigUseCase {
    store: Arc<dyn ConfigStorePort>,
    components: Vec<Arc<dyn Reconfigurable>>,
}

impl ReloadConfigUseCase {
    pub fn new(store: Arc<dyn ConfigStorePort>, components: Vec<Arc<dyn Reconfigurable>>) -> Self {
        Self { store, components }
    }

    pub fn current(&self) -> ConfigSnapshot {
        self.store.current()
    }

    /// An invalid config is refused before anything changes. A component
    /// that fails to apply keeps its previous settings; the first such
    /// error is returned after every component has been tried.
    #[instrument(skip(self, config))]
    pub fn execute(&self, config: Config) -> Result<ConfigSnapshot, DomainError> {
        config
            .validate()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))?;

        let snapshot = self.store.publish(config);
        let mut first_error = None;

        for component in &self.components {
            if let Err(e) = component.apply(&snapshot) {
                error!(component = component.component(), error = %e, "Failed to apply config");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(version = snapshot.version, "Configuration reloaded");
                Ok(snapshot)
            }
        }
    }
}
