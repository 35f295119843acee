use dnsguard_application::use_cases::BypassController;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Drops expired bypass grants and stale lockout records.
pub struct GrantReaperJob {
    bypass: Arc<BypassController>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl GrantReaperJob {
    pub fn new(bypass: Arc<BypassController>) -> Self {
        Self {
            bypass,
            interval_secs: 30,
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
        self.bypass.reap_expired()
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "Starting grant reaper job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("GrantReaperJob: shutting down");
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
