use super::fixtures::ScriptedTransport;
use dnsguard_application::ports::{Clock, Reconfigurable, SystemClock};
use dnsguard_application::use_cases::{
    BypassController, BypassSettings, CacheControlUseCase, DecisionPipeline, ReloadConfigUseCase,
    ReplaceRulesUseCase,
};
use dnsguard_domain::Config;
use dnsguard_infrastructure::dns::rules::LocalLists;
use dnsguard_infrastructure::{
    ConfigStore, InterfaceSelector, ResponseCache, RetryingResolver, RuleStore, TelemetryEmitter,
};
use std::sync::Arc;
use std::time::Duration;

/// The full core wired the way the binary wires it, over a scripted upstream.
///
/// Every clock is tokio's, so `start_paused` tests drive expiry and backoff
/// with `tokio::time::advance`.
pub struct Harness {
    pub rules: Arc<RuleStore>,
    pub cache: Arc<ResponseCache>,
    pub selector: Arc<InterfaceSelector>,
    pub transport: Arc<ScriptedTransport>,
    pub telemetry: Arc<TelemetryEmitter>,
    pub pipeline: Arc<DecisionPipeline>,
    pub bypass: Arc<BypassController>,
    pub cache_control: CacheControlUseCase,
    pub replace_rules: ReplaceRulesUseCase,
    pub reload: ReloadConfigUseCase,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        config.validate().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let telemetry = Arc::new(TelemetryEmitter::from_config(&config.telemetry));
        let rules = Arc::new(RuleStore::new(
            LocalLists::from_config(&config.blocking).unwrap(),
            clock.clone(),
        ));
        let cache = Arc::new(ResponseCache::new(
            config.cache.policy_table().unwrap(),
            config.cache.max_entries,
            clock.clone(),
        ));
        let selector = Arc::new(InterfaceSelector::from_config(&config.interfaces).unwrap());
        let transport = Arc::new(ScriptedTransport::new());
        let resolver = Arc::new(RetryingResolver::new(
            selector.clone(),
            transport.clone(),
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

        let components: Vec<Arc<dyn Reconfigurable>> = vec![
            rules.clone(),
            cache.clone(),
            selector.clone(),
            resolver,
            pipeline.clone(),
            bypass.clone(),
            telemetry.clone(),
        ];

        Self {
            cache_control: CacheControlUseCase::new(cache.clone()),
            replace_rules: ReplaceRulesUseCase::new(rules.clone(), telemetry.clone()),
            reload: ReloadConfigUseCase::new(Arc::new(ConfigStore::new(config)), components),
            rules,
            cache,
            selector,
            transport,
            telemetry,
            pipeline,
            bypass,
        }
    }

    pub fn from_toml(toml: &str) -> Self {
        Self::new(Config::from_toml_str(toml).unwrap())
    }
}
