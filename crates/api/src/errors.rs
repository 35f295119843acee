use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dnsguard_domain::DomainError;
use serde_json::json;
use tracing::error;

/// Maps domain errors onto HTTP status codes.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::PolicyLocked(_) => StatusCode::FORBIDDEN,
            DomainError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            DomainError::ManifestRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::GrantNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::InvalidDomainName(_) | DomainError::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
