use axum::{http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use crate::auth::TokenError;

pub type AppResult<T> = Result<T, AppError>;

/// Application error type shared by the gateway and every backend service
///
/// Client-facing messages are deliberately coarse: login failures and token
/// failures each collapse to a single message, and upstream failures never
/// expose the underlying transport error.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Authentication Errors =====
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No credentials supplied")]
    MissingCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    // ===== Gateway Errors =====
    #[error("No route matches path")]
    RouteNotFound,

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    // ===== Resource Errors =====
    #[error("Not found: {0}")]
    NotFound(String),

    // ===== Internal Server Errors =====
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::MissingCredentials
            | AppError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AppError::RouteNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) | AppError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a user-friendly error message (without sensitive details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::MissingCredentials => "No credentials supplied".to_string(),
            AppError::InvalidToken(_) => "Invalid token".to_string(),
            AppError::RouteNotFound => "Route not found".to_string(),
            AppError::UpstreamUnavailable(_) => "Upstream unavailable".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::MissingCredentials | AppError::InvalidToken(_) => "UNAUTHORIZED",
            AppError::RouteNotFound => "ROUTE_NOT_FOUND",
            AppError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(error_code = %code, "Authentication failed");
            // Sub-reason (malformed, bad signature, expired) stays out of warn-level logs
            tracing::debug!(error = %self, "Authentication failure detail");
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                "Client error occurred"
            );
        }
    }

    /// Create a not-found error for a business resource
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Create an upstream failure
    pub fn upstream(msg: impl Into<String>) -> Self {
        AppError::UpstreamUnavailable(msg.into())
    }

    /// Create an internal server error
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        let body = json!({
            "error": self.user_message(),
            "error_code": self.error_code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
