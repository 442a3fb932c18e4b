//! Error handling module for the jokes server.
//!
//! Provides the application error type with mapping to HTTP status codes and an
//! HTML error page.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::views::ErrorPage;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const RENDER_ERROR: &str = "RENDER_ERROR";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed or out-of-range request parameter
    InvalidParameter(String),
    /// Unknown joke, or a search without matches
    NotFound(String),
    /// I/O, decode or database failure, including an expired request deadline
    Storage(String),
    /// Template execution failure
    Render(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidParameter(_) => codes::INVALID_PARAMETER,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::Render(_) => codes::RENDER_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidParameter(msg)
            | AppError::NotFound(msg)
            | AppError::Storage(msg)
            | AppError::Render(msg) => msg,
        }
    }

    /// Text shown to the client. Server-side failures carry the diagnostic,
    /// client errors only echo what the client itself sent.
    fn public_detail(&self) -> Option<&str> {
        match self {
            AppError::InvalidParameter(msg) => Some(msg),
            AppError::NotFound(_) => None,
            AppError::Storage(msg) | AppError::Render(msg) => Some(msg),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::debug!("Database error: {:?}", err);
        AppError::Storage(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!("JSON error: {:?}", err);
        AppError::Storage(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::debug!("I/O error: {:?}", err);
        AppError::Storage(format!("I/O error: {}", err))
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        tracing::debug!("Template error: {:?}", err);
        AppError::Render(format!("Template error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Conversions log the source at debug; server errors are reported here once.
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self.message());
        } else {
            tracing::debug!(code = self.error_code(), "{}", self.message());
        }

        let page = ErrorPage {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error"),
            detail: self.public_detail().map(str::to_owned),
        };

        match askama::Template::render(&page) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(err) => {
                tracing::error!("Failed to render error page: {}", err);
                let body = match self.public_detail() {
                    Some(detail) => format!("{} {}: {}", status.as_u16(), page.reason, detail),
                    None => format!("{} {}", status.as_u16(), page.reason),
                };
                (status, body).into_response()
            }
        }
    }
}
