use async_trait::async_trait;
use dnsguard_domain::{DnsAnswer, DnsQuery, DomainError, NetworkInterface};
use std::net::SocketAddr;
use std::time::Duration;

/// One request/response exchange with one upstream server.
///
/// Transient failures are `TransportTimeout`, `TransportUnreachable` or
/// `IoError`; an NXDOMAIN or SERVFAIL reply is an `Ok` answer.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn exchange(
        &self,
        query: &DnsQuery,
        interface: &NetworkInterface,
        server: SocketAddr,
        timeout: Duration,
    ) -> Result<DnsAnswer, DomainError>;
}
