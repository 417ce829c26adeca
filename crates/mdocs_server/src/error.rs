//! HTTP error mapping for API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mdocs_core::AppError;
use serde_json::json;

/// Wrapper that turns [`AppError`] into a JSON error response.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl HttpError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::AlreadyExists(what) => {
                (StatusCode::CONFLICT, format!("Already exists: {}", what))
            }
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Io(err) => {
                tracing::error!("Filesystem error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Filesystem error".to_string(),
                )
            }
            AppError::CacheInconsistency(msg) => {
                tracing::error!("Cache inconsistency: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            other => {
                tracing::error!("Internal error: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
