use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rivals_discovery::{DiscoveryError, SearchFailure};

/// Boundary wrapper: the only place a [`DiscoveryError`] becomes a string.
#[derive(Debug)]
pub struct ApiError(pub DiscoveryError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<DiscoveryError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self.0 {
                DiscoveryError::Search(SearchFailure::Timeout(after)) => {
                    tracing::warn!(target: "server", timeout_ms = after.as_millis() as u64, "request.timeout");
                }
                other => tracing::error!(target: "server", error = ?other, "request.failed"),
            }
        }
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
