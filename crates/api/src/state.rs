use dnsguard_application::ports::{RuleEvaluatorPort, TelemetryPort};
use dnsguard_application::use_cases::{BypassController, CacheControlUseCase, ReplaceRulesUseCase};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub bypass: Arc<BypassController>,
    pub cache_control: Arc<CacheControlUseCase>,
    pub replace_rules: Arc<ReplaceRulesUseCase>,
    pub rules: Arc<dyn RuleEvaluatorPort>,
    pub telemetry: Arc<dyn TelemetryPort>,
    /// Identifier a pushed manifest must carry. `None` accepts any.
    pub manifest_identifier: Option<Arc<str>>,
}
