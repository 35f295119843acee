use crate::{dto::HealthResponse, state::AppState};
use axum::{extract::State, Json};
use tracing::debug;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok",
        rule_count: state.rules.rule_count(),
        rule_origin: state.rules.origin().map(|o| o.to_string()),
        cache_entries: state.cache_control.stats().entries,
        active_grants: state.bypass.active_grants().len(),
        telemetry_dropped: state.telemetry.dropped(),
    })
}
