use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use infra::StoreError;

/// Error taxonomy for the whole HTTP surface. Every failure a handler can
/// produce maps onto one of these; a single `IntoResponse` impl translates
/// them into the shared response envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// The entity exists but is in the wrong lifecycle state for the
    /// requested transition (e.g. approving an already-approved team).
    #[error("{0}")]
    InvalidState(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Unauthorized(_) => "authentication_error",
            AppError::Forbidden(_) => "authorization_error",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidState(_) => "invalid_state",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => AppError::Validation(format!("{what} already exists")),
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The cause stays server-side; the client only ever sees the
        // generic message for unexpected failures.
        if let AppError::Internal(err) = &self {
            tracing::error!(error = ?err, "unhandled internal error");
        }

        let body = Json(json!({
            "success": false,
            "error": self.code(),
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}
