use dnsguard_application::ports::ResponseCachePort;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Periodically removes expired cache entries. Lookups already skip them;
/// this only reclaims memory.
pub struct CacheSweepJob {
    cache: Arc<dyn ResponseCachePort>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl CacheSweepJob {
    pub fn new(cache: Arc<dyn ResponseCachePort>) -> Self {
        Self {
            cache,
            interval_secs: 60,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn run_once(&self) -> usize {
        let removed = self.cache.sweep_expired();
        if removed > 0 {
            debug!(removed, "Cache sweep removed expired entries");
        }
        removed
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "Starting cache sweep job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("CacheSweepJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.run_once();
                    }
                }
            }
        });
    }
}
