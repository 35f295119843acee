//! Wires adapters into use cases. One `Services` per process.

use dnsguard_api::AppState;
use dnsguard_application::ports::{
    Clock, ConfigStorePort, ManifestSourcePort, Reconfigurable, SystemClock,
};
use dnsguard_application::use_cases::{
    BypassController, BypassSettings, CacheControlUseCase, DecisionPipeline, ReloadConfigUseCase,
    ReplaceRulesUseCase,
};
use dnsguard_domain::Config;
use dnsguard_infrastructure::dns::rules::LocalLists;
use dnsguard_infrastructure::{
    ConfigStore, FileManifestSource, InterfaceSelector, ResponseCache, RetryingResolver,
    RuleStore, TelemetryEmitter, UdpTransport,
};
use dnsguard_jobs::{CacheSweepJob, GrantReaperJob, JobRunner, ManifestRefreshJob};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct Services {
    pub config_store: Arc<ConfigStore>,
    pub rules: Arc<RuleStore>,
    pub cache: Arc<ResponseCache>,
    pub resolver: Arc<RetryingResolver>,
    pub telemetry: Arc<TelemetryEmitter>,
    pub pipeline: Arc<DecisionPipeline>,
    pub bypass: Arc<BypassController>,
    pub cache_control: Arc<CacheControlUseCase>,
    pub replace_rules: Arc<ReplaceRulesUseCase>,
    pub reload: Arc<ReloadConfigUseCase>,
    pub manifest_source: Option<Arc<FileManifestSource>>,
}

impl Services {
    pub fn build(config: Config) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let telemetry = Arc::new(TelemetryEmitter::from_config(&config.telemetry));

        let rules = Arc::new(RuleStore::new(
            LocalLists::from_config(&config.blocking)?,
            clock.clone(),
        ));

        let cache = Arc::new(ResponseCache::new(
            config.cache.policy_table()?,
            config.cache.max_entries,
            clock.clone(),
        ));

        let selector = Arc::new(InterfaceSelector::from_config(&config.interfaces)?);

        let resolver = Arc::new(RetryingResolver::new(
            selector.clone(),
            Arc::new(UdpTransport::new()),
            telemetry.clone(),
            clock.clone(),
            config.interfaces.retry_policy(),
            Duration::from_millis(config.interfaces.attempt_timeout_ms),
        ));

        let pipeline = Arc::new(DecisionPipeline::new(
            rules.clone(),
            cache.clone(),
            resolver.clone(),
            telemetry.clone(),
            clock.clone(),
            Duration::from_millis(config.interfaces.query_timeout_ms),
        ));

        let bypass = Arc::new(BypassController::new(
            rules.clone(),
            telemetry.clone(),
            clock,
            BypassSettings::from_config(&config.bypass),
        ));
        if !config.bypass.has_credentials() {
            warn!("No bypass password or control token configured, bypass requests will be rejected");
        }

        let cache_control = Arc::new(CacheControlUseCase::new(cache.clone()));
        let replace_rules = Arc::new(ReplaceRulesUseCase::new(rules.clone(), telemetry.clone()));
        let manifest_source = FileManifestSource::from_config(&config.manifest).map(Arc::new);

        let config_store = Arc::new(ConfigStore::new(config));
        let components: Vec<Arc<dyn Reconfigurable>> = vec![
            rules.clone(),
            cache.clone(),
            selector,
            resolver.clone(),
            pipeline.clone(),
            bypass.clone(),
            telemetry.clone(),
        ];
        let reload = Arc::new(ReloadConfigUseCase::new(config_store.clone(), components));

        info!("Services wired");

        Ok(Self {
            config_store,
            rules,
            cache,
            resolver,
            telemetry,
            pipeline,
            bypass,
            cache_control,
            replace_rules,
            reload,
            manifest_source,
        })
    }

    pub fn config(&self) -> Arc<Config> {
        self.config_store.current().config
    }

    /// Applies the manifest file once, if one is configured. A rejected or
    /// missing manifest leaves only the local lists in force.
    pub async fn load_initial_manifest(&self) {
        let Some(source) = &self.manifest_source else {
            return;
        };
        let expected = self.config().manifest.identifier.clone();
        match source.fetch().await {
            Ok(Some(document)) => {
                if let Err(e) = self.replace_rules.execute(&document, Some(&expected)) {
                    warn!(error = %e, "Initial manifest rejected");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(path = %source.path().display(), error = %e, "Initial manifest unavailable"),
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            bypass: self.bypass.clone(),
            cache_control: self.cache_control.clone(),
            replace_rules: self.replace_rules.clone(),
            rules: self.rules.clone(),
            telemetry: self.telemetry.clone(),
            manifest_identifier: Some(Arc::from(self.config().manifest.identifier.as_str())),
        }
    }

    pub fn job_runner(&self) -> JobRunner {
        let config = self.config();
        let mut runner = JobRunner::new()
            .with_cache_sweep(
                CacheSweepJob::new(self.cache.clone()).with_interval(config.cache.sweep_interval_secs),
            )
            .with_grant_reaper(GrantReaperJob::new(self.bypass.clone()));

        if let Some(source) = &self.manifest_source {
            runner = runner.with_manifest_refresh(
                ManifestRefreshJob::new(source.clone(), self.replace_rules.clone())
                    .with_interval(config.manifest.update_interval_secs)
                    .with_expected_identifier(config.manifest.identifier.clone()),
            );
        }

        runner
    }
}
