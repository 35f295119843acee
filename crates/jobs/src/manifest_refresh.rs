use dnsguard_application::ports::ManifestSourcePort;
use dnsguard_application::use_cases::ReplaceRulesUseCase;
use dnsguard_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Re-reads the manifest on an interval and swaps the rule set when it
/// changed. A rejected document leaves the current rules in place.
pub struct ManifestRefreshJob {
    source: Arc<dyn ManifestSourcePort>,
    replace_rules: Arc<ReplaceRulesUseCase>,
    expected_identifier: Option<String>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl ManifestRefreshJob {
    pub fn new(source: Arc<dyn ManifestSourcePort>, replace_rules: Arc<ReplaceRulesUseCase>) -> Self {
        Self {
            source,
            replace_rules,
            expected_identifier: None,
            interval_secs: 300,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_expected_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.expected_identifier = Some(identifier.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// `Ok(None)` when the source reported no change.
    pub async fn run_once(&self) -> Result<Option<usize>, DomainError> {
        let Some(document) = self.source.fetch().await? else {
            return Ok(None);
        };
        let count = self
            .replace_rules
            .execute(&document, self.expected_identifier.as_deref())?;
        Ok(Some(count))
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            source = %self.source.describe(),
            interval_secs = self.interval_secs,
            "Starting manifest refresh job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("ManifestRefreshJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.run_once().await {
                            Ok(Some(rules)) => info!(rules, "ManifestRefreshJob: rules replaced"),
                            Ok(None) => {}
                            Err(e) => error!(error = %e, "ManifestRefreshJob: refresh failed"),
                        }
                    }
                }
            }
        });
    }
}
