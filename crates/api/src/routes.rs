use crate::handlers;
use crate::middleware::require_control_token;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

/// Creates all API routes with state.
///
/// Bypass requests carry their own credential. Everything that changes
/// cache, rules or existing grants needs the control token.
pub fn create_api_routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/bypass/{id}", delete(handlers::revoke_bypass))
        .route("/api/cache", delete(handlers::flush_cache))
        .route("/api/cache/ttl", put(handlers::set_cache_ttl))
        .route("/api/cache/bypass", post(handlers::add_cache_bypass))
        .route("/api/rules", post(handlers::replace_rules))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_control_token,
        ));

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route(
            "/api/bypass",
            post(handlers::create_bypass).get(handlers::list_bypass),
        )
        .route("/api/cache/stats", get(handlers::get_cache_stats))
        .merge(protected)
        .with_state(state)
}
