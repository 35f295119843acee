//! Adapters behind the application ports: rule store, response cache,
//! interface selection, upstream resolution, telemetry and configuration.

pub mod config_store;
pub mod dns;
pub mod manifest;
pub mod telemetry;

pub use config_store::ConfigStore;
pub use dns::{InterfaceSelector, ResponseCache, RetryingResolver, RuleStore, UdpTransport};
pub use manifest::FileManifestSource;
pub use telemetry::{TelemetryEmitter, TracingSink};
