use async_trait::async_trait;
use dnsguard_application::ports::UpstreamTransport;
use dnsguard_domain::{
    DnsAnswer, DnsQuery, DomainError, InterfaceId, NetworkInterface, RecordType, ResponseStatus,
    TransactionId,
};
use std::collections::VecDeque;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Common test domains
pub struct TestDomains;

impl TestDomains {
    pub fn example() -> &'static str {
        "example.com"
    }

    pub fn blocked_ad() -> &'static str {
        "ads.example.com"
    }

    pub fn blocked_tracker() -> &'static str {
        "tracker.malicious.net"
    }
}

pub fn query(domain: &str) -> DnsQuery {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    DnsQuery::new(domain, RecordType::A, TransactionId(NEXT.fetch_add(1, Ordering::Relaxed)))
}

pub fn answer(ip: &str) -> DnsAnswer {
    DnsAnswer::new(vec![ip.parse::<IpAddr>().unwrap()]).with_upstream_ttl(3600)
}

pub fn servfail() -> DnsAnswer {
    DnsAnswer::with_status(ResponseStatus::ServFail)
}

pub fn timeout_error() -> DomainError {
    DomainError::TransportTimeout {
        server: "192.0.2.1:53".into(),
    }
}

#[derive(Debug, Clone)]
pub struct Exchange {
    pub domain: String,
    pub interface: InterfaceId,
    pub server: SocketAddr,
    pub at: Instant,
}

/// Upstream stand-in. Plays back queued results, then answers 93.184.216.34.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<DnsAnswer, DomainError>>>,
    exchanges: Mutex<Vec<Exchange>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            exchanges: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }

    pub fn push(&self, result: Result<DnsAnswer, DomainError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn fail_times(&self, n: usize) {
        for _ in 0..n {
            self.push(Err(timeout_error()));
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.exchanges.lock().unwrap().clone()
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.lock().unwrap().len()
    }
}

#[async_trait]
impl UpstreamTransport for ScriptedTransport {
    async fn exchange(
        &self,
        query: &DnsQuery,
        interface: &NetworkInterface,
        server: SocketAddr,
        _timeout: Duration,
    ) -> Result<DnsAnswer, DomainError> {
        self.exchanges.lock().unwrap().push(Exchange {
            domain: query.domain.to_string(),
            interface: interface.id.clone(),
            server,
            at: Instant::now(),
        });
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(answer("93.184.216.34")))
    }
}
