use thiserror::Error;
use vbridge_core::CoreError;
use vbridge_model::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("not ready: {0}")]
    NotReady(String),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

#[cfg(feature = "http")]
impl ApiError {
    /// Status code and caller-facing message.
    pub fn status_and_detail(&self) -> (axum::http::StatusCode, String) {
        use axum::http::StatusCode;

        match self {
            ApiError::InvalidRequest(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::NotReady(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::Core(e) => match e {
                CoreError::DispatchFailed(q) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to dispatch request: {q}"),
                ),
                CoreError::RequestTimeout { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server timed out processing the request".to_string(),
                ),
                CoreError::StreamCreationFailed(upstream) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to add v4l2 stream: {upstream}"),
                ),
                CoreError::StreamListFailed(upstream) => (
                    StatusCode::BAD_GATEWAY,
                    format!("Failed to list streams: {upstream}"),
                ),
                other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            },
        }
    }
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, detail) = self.status_and_detail();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }
        (status, axum::Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
