//! Configuration module for dnsguard
//!
//! Structures are organized by concern:
//! - `root`: Main configuration, CLI overrides and versioned snapshots
//! - `server`: Control channel binding
//! - `blocking`: Local block/whitelists
//! - `manifest`: Rule-source manifest location and refresh cadence
//! - `cache`: Response cache policy
//! - `interfaces`: Interface binding, retry and VPN resolver settings
//! - `bypass`: Bypass credentials and rate limiting
//! - `telemetry`: Event emission and privacy
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod blocking;
pub mod bypass;
pub mod cache;
pub mod errors;
pub mod interfaces;
pub mod logging;
pub mod manifest;
pub mod root;
pub mod server;
pub mod telemetry;

pub use blocking::BlockingConfig;
pub use bypass::BypassConfig;
pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use interfaces::{InterfaceConfig, InterfacesConfig};
pub use logging::LoggingConfig;
pub use manifest::ManifestConfig;
pub use root::{CliOverrides, Config, ConfigSnapshot};
pub use server::ServerConfig;
pub use telemetry::TelemetryConfig;
