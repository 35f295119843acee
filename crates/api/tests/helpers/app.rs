use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use dnsguard_api::{create_api_routes, AppState};
use dnsguard_application::ports::{Clock, SystemClock};
use dnsguard_application::use_cases::{
    BypassController, BypassSettings, CacheControlUseCase, ReplaceRulesUseCase,
};
use dnsguard_domain::config::BypassConfig;
use dnsguard_domain::{CachePolicyTable, PrivacyLevel};
use dnsguard_infrastructure::dns::rules::LocalLists;
use dnsguard_infrastructure::telemetry::TelemetrySettings;
use dnsguard_infrastructure::{ResponseCache, RuleStore, TelemetryEmitter};
use http_body_util::BodyExt;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "letmein";
pub const TOKEN: &str = "control-secret";

pub struct TestApp {
    pub router: Router,
    pub rules: Arc<RuleStore>,
    pub cache: Arc<ResponseCache>,
}

pub fn app_with_policy(policy: CachePolicyTable) -> TestApp {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rules = Arc::new(RuleStore::new(LocalLists::permissive(), clock.clone()));
    let cache = Arc::new(ResponseCache::new(policy, 100, clock.clone()));
    let telemetry = Arc::new(TelemetryEmitter::new(TelemetrySettings {
        enabled: false,
        verbose: false,
        privacy: PrivacyLevel::Hashed,
        capacity: 16,
        client_id: Arc::from("api-test"),
    }));
    let bypass_config = BypassConfig {
        password: Some(PASSWORD.into()),
        auth_token: Some(TOKEN.into()),
        max_failed_attempts: 2,
        ..BypassConfig::default()
    };

    let state = AppState {
        bypass: Arc::new(BypassController::new(
            rules.clone(),
            telemetry.clone(),
            clock,
            BypassSettings::from_config(&bypass_config),
        )),
        cache_control: Arc::new(CacheControlUseCase::new(cache.clone())),
        replace_rules: Arc::new(ReplaceRulesUseCase::new(rules.clone(), telemetry.clone())),
        rules: rules.clone(),
        telemetry,
        manifest_identifier: Some(Arc::from("family")),
    };

    TestApp {
        router: create_api_routes(state),
        rules,
        cache,
    }
}

pub fn app() -> TestApp {
    app_with_policy(CachePolicyTable::new(true, Some(300)))
}

pub fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("x-control-token", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Attaches the peer address the server would see on a real connection.
pub fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
