use crate::{
    dto::{BypassRequest, GrantResponse},
    errors::ApiError,
    middleware::PeerIdentity,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use dnsguard_domain::{BypassScope, GrantId};
use std::time::Duration;
use tracing::{debug, instrument};

#[instrument(skip_all, fields(peer = peer.as_str()), name = "api_create_bypass")]
pub async fn create_bypass(
    State(state): State<AppState>,
    peer: PeerIdentity,
    Json(req): Json<BypassRequest>,
) -> Result<(StatusCode, Json<GrantResponse>), ApiError> {
    let scope = match req.domain.as_deref() {
        Some(domain) => BypassScope::domain(domain)?,
        None => BypassScope::All,
    };

    let grant = state.bypass.request(
        peer.as_str(),
        &req.credential,
        scope,
        req.ttl_secs.map(Duration::from_secs),
    )?;

    let remaining = state.bypass.remaining(&grant);
    Ok((StatusCode::CREATED, Json(GrantResponse::from_grant(&grant, remaining))))
}

pub async fn list_bypass(State(state): State<AppState>) -> Json<Vec<GrantResponse>> {
    let grants: Vec<GrantResponse> = state
        .bypass
        .active_grants()
        .iter()
        .map(|g| GrantResponse::from_grant(g, state.bypass.remaining(g)))
        .collect();
    debug!(count = grants.len(), "Active bypass grants listed");
    Json(grants)
}

#[instrument(skip(state), name = "api_revoke_bypass")]
pub async fn revoke_bypass(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: GrantId = id.parse()?;
    state.bypass.revoke(id)?;
    Ok(StatusCode::NO_CONTENT)
}
