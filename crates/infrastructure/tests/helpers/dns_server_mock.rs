use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// How the mock upstream answers.
#[derive(Debug, Clone, Copy)]
pub enum MockReply {
    /// NOERROR with a single A record.
    Address(Ipv4Addr, u32),
    NxDomain,
    ServFail,
    /// Reads the query, never answers.
    Silent,
    /// Answers with a flipped message id first, then the real answer.
    WrongIdFirst(Ipv4Addr),
}

/// Loopback UDP server speaking just enough DNS for transport tests.
pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(reply: MockReply) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let received = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&received);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let query = &buf[..len];
                        match reply {
                            MockReply::Silent => {}
                            MockReply::WrongIdFirst(ip) => {
                                let mut bogus = build_response(query, 0, Some((ip, 60)));
                                bogus[0] ^= 0xff;
                                let _ = socket.send_to(&bogus, peer).await;
                                let _ = socket.send_to(&build_response(query, 0, Some((ip, 60))), peer).await;
                            }
                            MockReply::Address(ip, ttl) => {
                                let _ = socket.send_to(&build_response(query, 0, Some((ip, ttl))), peer).await;
                            }
                            MockReply::NxDomain => {
                                let _ = socket.send_to(&build_response(query, 3, None), peer).await;
                            }
                            MockReply::ServFail => {
                                let _ = socket.send_to(&build_response(query, 2, None), peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Echoes the header and question, sets QR/RD/RA and `rcode`, and appends
/// one A record when `answer` is given.
fn build_response(query: &[u8], rcode: u8, answer: Option<(Ipv4Addr, u32)>) -> Vec<u8> {
    if query.len() < 12 {
        return vec![];
    }

    let mut response = Vec::with_capacity(512);
    response.extend_from_slice(&query[0..2]);
    response.push(0x81);
    response.push(0x80 | (rcode & 0x0f));
    response.extend_from_slice(&query[4..6]);
    response.extend_from_slice(&[0x00, if answer.is_some() { 1 } else { 0 }]);
    response.extend_from_slice(&[0x00, 0x00]);
    response.extend_from_slice(&[0x00, 0x00]);
    response.extend_from_slice(&query[12..]);

    if let Some((ip, ttl)) = answer {
        response.extend_from_slice(&[0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01]);
        response.extend_from_slice(&ttl.to_be_bytes());
        response.extend_from_slice(&[0x00, 0x04]);
        response.extend_from_slice(&ip.octets());
    }

    response
}
