use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error surfaced to callers of the authenticator.
///
/// The serialized shape matches what the introspection service sends back on
/// failure, so a remote rejection can be decoded straight into this type and
/// handed to the caller verbatim:
///
/// ```json
/// { "message": "access token not found", "code": 404, "error": "not_found" }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (status {status}): {cause}")]
pub struct RestError {
    /// Human readable message
    #[serde(default)]
    pub message: String,
    /// HTTP-style status code, as sent by the remote (any integer)
    #[serde(rename = "code")]
    pub status: i64,
    /// Underlying cause
    #[serde(rename = "error", default)]
    pub cause: String,
}

/// Coarse classification of a [`RestError`] by status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    InternalServerError,
    /// Any status outside the taxonomy (e.g. 401 passed through from the remote)
    Other,
}

impl RestError {
    pub fn bad_request(message: impl Into<String>, cause: impl Display) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message, cause)
    }

    pub fn not_found(message: impl Into<String>, cause: impl Display) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, message, cause)
    }

    pub fn internal_server_error(message: impl Into<String>, cause: impl Display) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, message, cause)
    }

    fn with_status(status: StatusCode, message: impl Into<String>, cause: impl Display) -> Self {
        Self {
            message: message.into(),
            status: i64::from(status.as_u16()),
            cause: cause.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status {
            400 => ErrorKind::BadRequest,
            404 => ErrorKind::NotFound,
            500 => ErrorKind::InternalServerError,
            _ => ErrorKind::Other,
        }
    }

    /// HTTP status used when this error answers a request.
    ///
    /// Anything that is not a 4xx or 5xx code renders as 500; `status` itself
    /// is left untouched.
    pub fn response_status(&self) -> StatusCode {
        u16::try_from(self.status)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .filter(|code| code.is_client_error() || code.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.response_status();

        tracing::warn!(
            status = self.status,
            message = %self.message,
            cause = %self.cause,
            "Rejecting request after failed authentication"
        );

        (status, axum::Json(self)).into_response()
    }
}

/// Process-level errors raised while configuring and starting the service.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
