use super::{
    BlockingConfig, BypassConfig, CacheConfig, ConfigError, InterfacesConfig, LoggingConfig,
    ManifestConfig, ServerConfig, TelemetryConfig,
};
use crate::RulePattern;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub blocking: BlockingConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub interfaces: InterfacesConfig,

    #[serde(default)]
    pub bypass: BypassConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub control_port: Option<u16>,
    pub log_level: Option<String>,
    pub manifest_path: Option<String>,
}

impl Config {
    /// Loads `path` (or defaults when absent), applies overrides, validates.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) if Path::new(p).exists() => Self::from_file(p)?,
            Some(p) => {
                return Err(ConfigError::Io {
                    path: p.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
                })
            }
            None => Self::default(),
        };

        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(addr) = overrides.bind_address {
            self.server.bind_address = addr;
        }
        if let Some(port) = overrides.control_port {
            self.server.control_port = port;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(path) = overrides.manifest_path {
            self.manifest.path = Some(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.control_port == 0 {
            return Err(ConfigError::invalid("server.control_port", "must be non-zero"));
        }

        for entry in &self.blocking.blocked_domains {
            RulePattern::parse_list_entry(entry)
                .map_err(|e| ConfigError::invalid("blocking.blocked_domains", e.to_string()))?;
        }
        for entry in &self.blocking.whitelisted_domains {
            RulePattern::parse_list_entry(entry)
                .map_err(|e| ConfigError::invalid("blocking.whitelisted_domains", e.to_string()))?;
        }

        if self.manifest.identifier.trim().is_empty() {
            return Err(ConfigError::invalid("manifest.identifier", "must not be empty"));
        }
        if self.manifest.update_interval_secs == 0 {
            return Err(ConfigError::invalid("manifest.update_interval_secs", "must be non-zero"));
        }

        self.cache.policy_table()?;
        if self.cache.max_entries == 0 {
            return Err(ConfigError::invalid("cache.max_entries", "must be non-zero"));
        }
        if self.cache.sweep_interval_secs == 0 {
            return Err(ConfigError::invalid("cache.sweep_interval_secs", "must be non-zero"));
        }

        if self.interfaces.max_retries == 0 {
            return Err(ConfigError::invalid("interfaces.max_retries", "must be at least 1"));
        }
        if self.interfaces.initial_backoff_ms == 0 {
            return Err(ConfigError::invalid("interfaces.initial_backoff_ms", "must be non-zero"));
        }
        if self.interfaces.initial_backoff_ms > self.interfaces.max_backoff_ms {
            return Err(ConfigError::invalid(
                "interfaces.initial_backoff_ms",
                "must not exceed max_backoff_ms",
            ));
        }
        if self.interfaces.query_timeout_ms == 0 {
            return Err(ConfigError::invalid("interfaces.query_timeout_ms", "must be non-zero"));
        }
        let interfaces = self.interfaces.network_interfaces()?;
        if interfaces.iter().all(|i| i.resolvers.is_empty()) {
            return Err(ConfigError::invalid("interfaces", "no resolver configured"));
        }
        self.interfaces.vpn_domains()?;
        for id in &self.interfaces.preferred {
            if self.interfaces.binding_enabled && !interfaces.iter().any(|i| i.id.as_str() == id) {
                return Err(ConfigError::invalid(
                    "interfaces.preferred",
                    format!("unknown interface '{id}'"),
                ));
            }
        }

        if self.bypass.max_grant_secs == 0 {
            return Err(ConfigError::invalid("bypass.max_grant_secs", "must be non-zero"));
        }
        if self.bypass.max_failed_attempts == 0 {
            return Err(ConfigError::invalid("bypass.max_failed_attempts", "must be at least 1"));
        }
        if self.bypass.max_failed_attempts_total == 0 {
            return Err(ConfigError::invalid(
                "bypass.max_failed_attempts_total",
                "must be at least 1",
            ));
        }

        if self.telemetry.queue_capacity == 0 {
            return Err(ConfigError::invalid("telemetry.queue_capacity", "must be non-zero"));
        }

        if let Some(id) = &self.telemetry.client_identifier {
            if id.trim().is_empty() {
                return Err(ConfigError::invalid("telemetry.client_identifier", "must not be blank"));
            }
        }

        Ok(())
    }

    /// Validated, normalized names from `blocking.whitelisted_domains`.
    pub fn whitelist_patterns(&self) -> Vec<RulePattern> {
        self.blocking
            .whitelisted_domains
            .iter()
            .filter_map(|e| RulePattern::parse_list_entry(e).ok())
            .collect()
    }
}

/// An immutable, versioned configuration.
///
/// Readers hold the `Arc` for as long as they need a consistent view;
/// updates publish a new snapshot with a higher version.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub version: u64,
    pub config: Arc<Config>,
}

impl ConfigSnapshot {
    pub fn new(version: u64, config: Config) -> Self {
        Self {
            version,
            config: Arc::new(config),
        }
    }

    pub fn next(&self, config: Config) -> Self {
        Self::new(self.version + 1, config)
    }
}
