use super::ConfigError;
use crate::validators::validate_domain_name;
use crate::{InterfaceKind, InterfaceStrategy, NetworkInterface, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// A configured network path
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterfaceConfig {
    /// Interface identifier, e.g. "en0" or "utun3"
    pub id: String,

    #[serde(default)]
    pub kind: InterfaceKind,

    /// Local address to bind upstream sockets to
    #[serde(default)]
    pub bind_addr: Option<String>,

    /// Resolvers reachable over this interface ("ip:port", port defaults to 53)
    #[serde(default)]
    pub resolvers: Vec<String>,
}

/// Interface binding, retry and VPN resolver settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterfacesConfig {
    /// When off, queries use `default_resolvers` over the OS default route
    #[serde(default)]
    pub binding_enabled: bool,

    #[serde(default)]
    pub strategy: InterfaceStrategy,

    /// Pin every retry of a transaction to its first interface
    #[serde(default = "default_true")]
    pub sticky_per_transaction: bool,

    /// Total attempts per resolution, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Overall per-query deadline; wins over any pending backoff
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Per-attempt upstream timeout
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// Domains routed over a VPN interface under the `vpn_aware` strategy
    #[serde(default)]
    pub vpn_resolvers: Vec<String>,

    /// Interface ids in preference order (`preferred_first` strategy)
    #[serde(default)]
    pub preferred: Vec<String>,

    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,

    /// Used when binding is disabled or no interface is configured
    #[serde(default = "default_resolvers")]
    pub default_resolvers: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    2000
}

fn default_query_timeout_ms() -> u64 {
    5000
}

fn default_attempt_timeout_ms() -> u64 {
    1500
}

fn default_resolvers() -> Vec<String> {
    vec!["1.1.1.1:53".to_string(), "8.8.8.8:53".to_string()]
}

impl Default for InterfacesConfig {
    fn default() -> Self {
        Self {
            binding_enabled: false,
            strategy: InterfaceStrategy::default(),
            sticky_per_transaction: true,
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            vpn_resolvers: vec![],
            preferred: vec![],
            interfaces: vec![],
            default_resolvers: default_resolvers(),
        }
    }
}

/// Identifier of the implicit interface used when binding is off.
pub const DEFAULT_INTERFACE_ID: &str = "default";

impl InterfacesConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.initial_backoff_ms, self.max_backoff_ms)
    }

    /// Concrete interfaces the selector works with. With binding off this is a
    /// single OS-routed path over `default_resolvers`.
    pub fn network_interfaces(&self) -> Result<Vec<NetworkInterface>, ConfigError> {
        if !self.binding_enabled || self.interfaces.is_empty() {
            let resolvers = parse_resolvers("interfaces.default_resolvers", &self.default_resolvers)?;
            return Ok(vec![NetworkInterface::new(
                DEFAULT_INTERFACE_ID,
                InterfaceKind::Physical,
                resolvers,
            )]);
        }

        self.interfaces
            .iter()
            .map(|cfg| {
                let resolvers = parse_resolvers("interfaces.resolvers", &cfg.resolvers)?;
                let mut iface = NetworkInterface::new(&cfg.id, cfg.kind, resolvers);
                if let Some(addr) = &cfg.bind_addr {
                    let ip: IpAddr = addr.parse().map_err(|_| {
                        ConfigError::invalid("interfaces.bind_addr", format!("'{addr}' is not an IP"))
                    })?;
                    iface = iface.with_bind_addr(ip);
                }
                Ok(iface)
            })
            .collect()
    }

    /// Normalized VPN resolver domains.
    pub fn vpn_domains(&self) -> Result<Vec<String>, ConfigError> {
        self.vpn_resolvers
            .iter()
            .map(|d| {
                validate_domain_name(d)
                    .map_err(|e| ConfigError::invalid("interfaces.vpn_resolvers", e.to_string()))
            })
            .collect()
    }
}

/// Parses "ip" or "ip:port" (port 53 when omitted).
pub fn parse_resolver(raw: &str) -> Option<SocketAddr> {
    raw.parse::<SocketAddr>()
        .ok()
        .or_else(|| raw.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, 53)))
}

fn parse_resolvers(field: &'static str, raw: &[String]) -> Result<Vec<SocketAddr>, ConfigError> {
    raw.iter()
        .map(|r| {
            parse_resolver(r)
                .ok_or_else(|| ConfigError::invalid(field, format!("'{r}' is not a socket address")))
        })
        .collect()
}
