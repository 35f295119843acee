use crate::{
    dto::{CacheBypassRequest, CacheStatsResponse, FlushResponse, SetTtlRequest},
    errors::ApiError,
    state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use tracing::{debug, instrument};

#[instrument(skip(state), name = "api_get_cache_stats")]
pub async fn get_cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache_control.stats();
    debug!(
        total_entries = stats.entries,
        hits = stats.hits,
        misses = stats.misses,
        hit_rate = stats.hit_rate,
        "Cache statistics retrieved"
    );
    Json(stats.into())
}

#[instrument(skip(state, req), name = "api_set_cache_ttl")]
pub async fn set_cache_ttl(
    State(state): State<AppState>,
    Json(req): Json<SetTtlRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .cache_control
        .set_ttl(req.domain.as_deref(), req.ttl_secs)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, req), name = "api_add_cache_bypass")]
pub async fn add_cache_bypass(
    State(state): State<AppState>,
    Json(req): Json<CacheBypassRequest>,
) -> Result<StatusCode, ApiError> {
    state.cache_control.add_bypass(&req.domain)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state), name = "api_flush_cache")]
pub async fn flush_cache(State(state): State<AppState>) -> Result<Json<FlushResponse>, ApiError> {
    let removed = state.cache_control.flush()?;
    Ok(Json(FlushResponse { removed }))
}
