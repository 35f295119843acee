use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceId(pub Arc<str>);

impl InterfaceId {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    #[default]
    Physical,
    Vpn,
}

/// A network path a query can leave through, together with the resolvers
/// reachable over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub id: InterfaceId,
    pub kind: InterfaceKind,
    /// Local address the upstream socket binds to. `None` lets the OS route.
    pub bind_addr: Option<IpAddr>,
    pub resolvers: Arc<[SocketAddr]>,
    pub available: bool,
}

impl NetworkInterface {
    pub fn new(id: &str, kind: InterfaceKind, resolvers: Vec<SocketAddr>) -> Self {
        Self {
            id: InterfaceId::new(id),
            kind,
            bind_addr: None,
            resolvers: Arc::from(resolvers),
            available: true,
        }
    }

    pub fn with_bind_addr(mut self, addr: IpAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn is_vpn(&self) -> bool {
        self.kind == InterfaceKind::Vpn
    }

    /// Resolver to use on the `attempt`-th try over this interface.
    pub fn resolver_for_attempt(&self, attempt: u32) -> Option<SocketAddr> {
        if self.resolvers.is_empty() {
            return None;
        }
        Some(self.resolvers[attempt as usize % self.resolvers.len()])
    }
}

/// Interface selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceStrategy {
    RoundRobin,
    #[default]
    PreferredFirst,
    VpnAware,
}

impl InterfaceStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::PreferredFirst => "preferred_first",
            Self::VpnAware => "vpn_aware",
        }
    }
}

impl FromStr for InterfaceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "preferred_first" | "preferred" => Ok(Self::PreferredFirst),
            "vpn_aware" | "vpn" => Ok(Self::VpnAware),
            other => Err(format!("unknown interface strategy '{other}'")),
        }
    }
}

impl fmt::Display for InterfaceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
