use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;

/// Upstream response code, reduced to what the pipeline acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    NoError,
    NxDomain,
    ServFail,
    Refused,
    Other,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoError => "NOERROR",
            Self::NxDomain => "NXDOMAIN",
            Self::ServFail => "SERVFAIL",
            Self::Refused => "REFUSED",
            Self::Other => "OTHER",
        }
    }
}

/// A resolved DNS answer.
///
/// Everything behind `Arc` so a cache hit hands out the same allocation the
/// resolver produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub status: ResponseStatus,
    pub addresses: Arc<Vec<IpAddr>>,
    pub cname_chain: Arc<[Arc<str>]>,
    /// Smallest TTL across the answer section, as reported upstream.
    pub upstream_ttl: Option<u32>,
    /// Raw wire bytes, when the answer came off the network.
    pub wire: Option<Arc<[u8]>>,
}

impl DnsAnswer {
    pub fn new(addresses: Vec<IpAddr>) -> Self {
        Self {
            status: ResponseStatus::NoError,
            addresses: Arc::new(addresses),
            cname_chain: Arc::from([]),
            upstream_ttl: None,
            wire: None,
        }
    }

    pub fn with_status(status: ResponseStatus) -> Self {
        Self {
            status,
            ..Self::new(vec![])
        }
    }

    pub fn with_upstream_ttl(mut self, ttl: u32) -> Self {
        self.upstream_ttl = Some(ttl);
        self
    }

    pub fn with_cname_chain(mut self, chain: Vec<Arc<str>>) -> Self {
        self.cname_chain = Arc::from(chain);
        self
    }

    pub fn is_negative(&self) -> bool {
        self.status == ResponseStatus::NxDomain
            || (self.status == ResponseStatus::NoError
                && self.addresses.is_empty()
                && self.cname_chain.is_empty())
    }

    /// Server-side failures are never cached.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status, ResponseStatus::ServFail | ResponseStatus::Refused)
    }
}
