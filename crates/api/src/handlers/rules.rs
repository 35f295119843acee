use crate::{dto::ReplaceRulesResponse, errors::ApiError, state::AppState};
use axum::{extract::State, Json};
use dnsguard_domain::ManifestDocument;
use tracing::instrument;

#[instrument(skip(state, document), fields(identifier = %document.identifier), name = "api_replace_rules")]
pub async fn replace_rules(
    State(state): State<AppState>,
    Json(document): Json<ManifestDocument>,
) -> Result<Json<ReplaceRulesResponse>, ApiError> {
    let rule_count = state
        .replace_rules
        .execute(&document, state.manifest_identifier.as_deref())?;

    Ok(Json(ReplaceRulesResponse {
        rule_count,
        origin: state.rules.origin().map(|o| o.to_string()),
    }))
}
