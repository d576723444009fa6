//! Error types for domscope-server
//!
//! Every handler error renders as `{"error": {"code", "message", "details"?}}`.

use crate::providers::ProviderError;
use crate::services::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource already exists (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream provider failure (502); `details` is the provider's payload
    #[error("{provider} error: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
        details: Value,
    },

    /// domscope-common error
    #[error("Common error: {0}")]
    Common(#[from] domscope_common::Error),
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Upstream {
            provider: err.provider(),
            message: err.to_string(),
            details: err.payload(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Duplicate(domain) => {
                ApiError::Conflict(format!("Domain {} already exists", domain))
            }
            ServiceError::Resolution { message, .. } => ApiError::BadRequest(message),
            ServiceError::Upstream(e) => e.into(),
            ServiceError::Common(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            ApiError::Upstream {
                provider,
                message,
                details,
            } => {
                tracing::warn!(provider = provider, "Upstream failure: {}", message);
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message, Some(details))
            }
            ApiError::Common(domscope_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None)
            }
            ApiError::Common(ref err) => {
                tracing::error!("Common error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMMON_ERROR",
                    err.to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
