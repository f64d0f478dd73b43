//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use latch_core::AccessError;

/// Wire form of an error
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// Error surfaced by a request handler
#[derive(Debug)]
pub struct ApiError(pub AccessError);

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            AccessError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AccessError::SubmissionNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AccessError::Unauthorized => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AccessError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            AccessError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_ERROR"),
            AccessError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
        };

        if self.0.is_retryable() {
            tracing::warn!(error = %self.0, "retryable request failure");
        }

        let body = ErrorBody {
            error: self.0.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}
