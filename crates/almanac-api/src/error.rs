//! Error type shared by every handler.
//!
//! JSON endpoints return these directly; page handlers catch the
//! user-facing variants and render them inline instead.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input: mismatched passwords, bad file type, bad timestamp
    #[error("{0}")]
    Validation(String),

    /// Username already registered
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials
    #[error("Invalid information")]
    Unauthorized,

    /// Storage or runtime failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    /// True for errors caused by the caller rather than the server.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, ApiError::Internal(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let error = match &self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
