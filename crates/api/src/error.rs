//! Error types for the HTTP layer.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sos_engine::EngineError;
use thiserror::Error;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Engine failure.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Request body could not be parsed.
    #[error("Invalid request body: {0}")]
    BadBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            ApiError::BadBody(_) => (StatusCode::BAD_REQUEST, self.to_string(), None),
            ApiError::Engine(err) => {
                let status = match err {
                    EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                    EngineError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                    EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                    EngineError::Conflict(_) => StatusCode::CONFLICT,
                    EngineError::Internal(msg) => {
                        tracing::error!("Internal error: {}", msg);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    EngineError::Upstream { .. } => {
                        tracing::error!("Store error: {}", err);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.public_message(), err.upstream_details())
            }
        };

        let body = match details {
            Some(details) => serde_json::json!({ "message": message, "details": details }),
            None => serde_json::json!({ "message": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
