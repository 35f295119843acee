use crate::dns::forwarding::{MessageBuilder, ResponseParser};
use async_trait::async_trait;
use bytes::Bytes;
use dnsguard_application::ports::UpstreamTransport;
use dnsguard_domain::{DnsAnswer, DnsQuery, DomainError, NetworkInterface};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP, one fresh socket per exchange.
///
/// When the interface carries a `bind_addr` the socket is bound to it, so
/// the datagram leaves through that interface.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpTransport;

impl UdpTransport {
    pub fn new() -> Self {
        Self
    }

    fn bind_socket(interface: &NetworkInterface, server: SocketAddr) -> io::Result<UdpSocket> {
        let local_ip = match (interface.bind_addr, server) {
            (Some(ip), _) => ip,
            (None, SocketAddr::V4(_)) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            (None, SocketAddr::V6(_)) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let local = SocketAddr::new(local_ip, 0);

        let socket = Socket::new(Domain::for_address(local), Type::DGRAM, Some(Protocol::UDP))?;
        socket.bind(&local.into())?;
        socket.set_nonblocking(true)?;
        UdpSocket::from_std(socket.into())
    }

    async fn send_and_receive(
        socket: &UdpSocket,
        server: SocketAddr,
        message_id: u16,
        message_bytes: &[u8],
    ) -> io::Result<Bytes> {
        let bytes_sent = socket.send_to(message_bytes, server).await?;
        debug!(server = %server, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let (bytes_received, from_addr) = socket.recv_from(&mut recv_buf).await?;

            if from_addr != server {
                warn!(expected = %server, received_from = %from_addr, "UDP response from unexpected source");
                continue;
            }
            if bytes_received < 2 || u16::from_be_bytes([recv_buf[0], recv_buf[1]]) != message_id {
                debug!(server = %server, "Discarding UDP response with mismatched id");
                continue;
            }

            recv_buf.truncate(bytes_received);
            return Ok(Bytes::from(recv_buf));
        }
    }
}

fn unreachable(server: SocketAddr, e: io::Error) -> DomainError {
    DomainError::TransportUnreachable {
        server: server.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl UpstreamTransport for UdpTransport {
    async fn exchange(
        &self,
        query: &DnsQuery,
        interface: &NetworkInterface,
        server: SocketAddr,
        timeout: Duration,
    ) -> Result<DnsAnswer, DomainError> {
        let (message_id, message_bytes) = MessageBuilder::build_query(&query.domain, query.record_type)?;

        let socket = Self::bind_socket(interface, server).map_err(|e| unreachable(server, e))?;

        let response = tokio::time::timeout(
            timeout,
            Self::send_and_receive(&socket, server, message_id, &message_bytes),
        )
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: server.to_string(),
        })?
        .map_err(|e| unreachable(server, e))?;

        debug!(
            server = %server,
            interface = %interface.id,
            bytes_received = response.len(),
            "UDP response received"
        );

        let parsed = ResponseParser::parse(response)?;
        if parsed.truncated {
            debug!(domain = %query.domain, "Truncated UDP response, using partial answer");
        }
        Ok(parsed.into_answer())
    }
}
