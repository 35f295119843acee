use crate::{CacheSweepJob, GrantReaperJob, ManifestRefreshJob};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Central orchestrator for all background jobs.
///
/// Each registered job gets a child of the runner's token; cancelling
/// `cancellation_token()` stops them all.
///
/// # Example
///
/// ```rust,ignore
/// let runner = JobRunner::new()
///     .with_cache_sweep(CacheSweepJob::new(cache).with_interval(60))
///     .with_grant_reaper(GrantReaperJob::new(bypass));
/// let token = runner.cancellation_token();
/// runner.start().await;
/// ```
pub struct JobRunner {
    cache_sweep: Option<CacheSweepJob>,
    manifest_refresh: Option<ManifestRefreshJob>,
    grant_reaper: Option<GrantReaperJob>,
    shutdown: CancellationToken,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            cache_sweep: None,
            manifest_refresh: None,
            grant_reaper: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cache_sweep(mut self, job: CacheSweepJob) -> Self {
        self.cache_sweep = Some(job.with_cancellation(self.shutdown.child_token()));
        self
    }

    pub fn with_manifest_refresh(mut self, job: ManifestRefreshJob) -> Self {
        self.manifest_refresh = Some(job.with_cancellation(self.shutdown.child_token()));
        self
    }

    pub fn with_grant_reaper(mut self, job: GrantReaperJob) -> Self {
        self.grant_reaper = Some(job.with_cancellation(self.shutdown.child_token()));
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn job_count(&self) -> usize {
        [
            self.cache_sweep.is_some(),
            self.manifest_refresh.is_some(),
            self.grant_reaper.is_some(),
        ]
        .into_iter()
        .filter(|registered| *registered)
        .count()
    }

    /// Start all registered background jobs.
    pub async fn start(self) {
        info!(jobs = self.job_count(), "Starting background job runner");

        if let Some(job) = self.cache_sweep {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.manifest_refresh {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.grant_reaper {
            Arc::new(job).start().await;
        }

        info!("All background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
