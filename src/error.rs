//! Defines the application's primary error type `AppError` and a convenience `Result` alias.
//!
//! Uses the `thiserror` crate for ergonomic error definition and provides `From`
//! implementations to convert common external errors into `AppError` variants.
//! Errors that do not implement `Clone` are wrapped in `Arc` to allow `AppError` to be cloneable.
//!
//! `AppError` also implements axum's `IntoResponse`, so handlers can return it
//! directly and the caller sees `{"error": "<message>"}` with the matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// The primary error enumeration for all application-specific errors.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// Caller-supplied input was missing or malformed.
    #[error("{0}")]
    Input(String),

    /// Every requested year was skipped or came back without complete records.
    #[error("No valid data returned from NASA POWER API.")]
    NoData,

    /// Error originating from the NASA POWER client (`reqwest`): timeouts,
    /// transport failures and non-2xx statuses.
    #[error("API Error: {0}")]
    Api(Arc<reqwest::Error>),

    /// Error during JSON parsing (`serde_json`). Wrapped in Arc as serde_json::Error is not Clone.
    #[error("JSON Parsing Error: {0}")]
    JsonParse(Arc<serde_json::Error>),

    /// The provider payload decoded but lacked an expected key.
    #[error("Missing field in provider response: {0}")]
    MissingField(String),

    /// The provider payload had the expected keys but unusable values.
    #[error("Malformed provider response: {0}")]
    Malformed(String),

    /// Invalid startup configuration.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error related to standard I/O operations.
    #[error("I/O Error: {0}")]
    Io(Arc<std::io::Error>),

    /// Anything else that should never reach a caller as a 4xx.
    #[error("Internal Error: {0}")]
    Internal(String),
}

/// A specialized `Result` type using the application's `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Convenience constructor for caller-induced failures.
    pub fn input(msg: impl Into<String>) -> Self {
        AppError::Input(msg.into())
    }

    /// Whether the error came from the upstream provider. These are skipped per
    /// year and never surface to callers on their own.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::Api(_)
                | AppError::JsonParse(_)
                | AppError::MissingField(_)
                | AppError::Malformed(_)
        )
    }

    /// HTTP status the error maps to at the endpoint layer.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Input(_) | AppError::NoData => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// --- From implementations ---
// These allow easy conversion from external error types into AppError
// using the `?` operator. Arc is used for non-Clone error types.

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Api(Arc::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonParse(Arc::new(err))
    }
}
