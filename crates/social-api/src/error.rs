use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use social_core::CoreError;
use tracing::error;

/// Everything a handler can fail with, mapped onto an HTTP status and a
/// `{"error": "..."}` body.
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    BadRequest(String),
    Unauthorized,
    Conflict(String),
    Internal,
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Core(CoreError::Storage(err))
    }
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            Self::Core(err) => match err {
                CoreError::Validation(_) | CoreError::InvalidOperation(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                CoreError::Forbidden(_) | CoreError::NotParticipant => {
                    (StatusCode::FORBIDDEN, err.to_string())
                }
                CoreError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                CoreError::Storage(e) => {
                    error!("Storage error: {:#}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
                }
            },
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".into()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
