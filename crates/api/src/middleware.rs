use crate::state::AppState;
use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, Extensions, HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::warn;

pub const CONTROL_TOKEN_HEADER: &str = "x-control-token";

/// Identity used when the connection carries no peer address.
pub const LOCAL_IDENTITY: &str = "local";

pub fn is_read_only_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Token from `X-Control-Token`, or `Authorization: Bearer <token>`.
pub fn presented_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(CONTROL_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(value.trim());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Caller identity for failed-attempt accounting: the peer IP address,
/// never anything the client writes into the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerIdentity(pub String);

impl PeerIdentity {
    pub fn from_extensions(extensions: &Extensions) -> Self {
        let identity = extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| LOCAL_IDENTITY.to_string());
        Self(identity)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for PeerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_extensions(&parts.extensions))
    }
}

/// Rejects mutating requests that do not carry the control token.
///
/// Wrong tokens count against the caller's failed attempts; a missing
/// token does not.
pub async fn require_control_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_read_only_method(request.method()) {
        return next.run(request).await;
    }

    let peer = PeerIdentity::from_extensions(request.extensions());
    let authorized = match presented_token(request.headers()) {
        Some(token) => state.bypass.authorize_control(peer.as_str(), token).is_ok(),
        None => false,
    };

    if !authorized {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            peer = peer.as_str(),
            "Control token rejected"
        );
        return (StatusCode::UNAUTHORIZED, "control token required").into_response();
    }

    next.run(request).await
}
