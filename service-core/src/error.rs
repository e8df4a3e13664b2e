use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Message returned for every fault that is not reported verbatim.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    /// An upstream provider rejected or failed the call. The message is
    /// returned to the caller as-is.
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Uniform failure body: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// The generic 500 used by the outermost fallbacks.
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            AppError::ProviderError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Unhandled internal error");
                return internal_error_response();
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error surfaced to a request");
                return internal_error_response();
            }
        };

        (status, Json(ErrorResponse::new(error_message))).into_response()
    }
}
