mod clock;
mod config_store;
mod interface_selector;
mod manifest_source;
mod resolver;
mod response_cache;
mod rule_evaluator;
mod telemetry;
mod upstream_transport;

pub use clock::{Clock, SystemClock};
pub use config_store::{ConfigStorePort, Reconfigurable};
pub use interface_selector::{InterfaceSelectorPort, TransactionBinding};
pub use manifest_source::ManifestSourcePort;
pub use resolver::{Resolution, ResolverPort};
pub use response_cache::{CacheEntry, CacheStats, ResponseCachePort};
pub use rule_evaluator::{BypassGrantStore, RuleEvaluatorPort};
pub use telemetry::{TelemetryPort, TelemetryRecord, TelemetrySink};
pub use upstream_transport::UpstreamTransport;
