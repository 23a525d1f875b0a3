//! Error types for the agent registry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by registry operations, the directory API and the client helper.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed or missing URL in a request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Agent card could not be fetched or parsed
    #[error("Failed to resolve agent card from {url}: {source}")]
    ResolutionFailed {
        url: String,
        #[source]
        source: ResolveError,
    },

    /// No live record for the given URL
    #[error("Agent not found: {0}")]
    NotFound(String),

    /// Registry could not be reached or refused the call (client side)
    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    pub fn resolution(url: impl Into<String>, source: ResolveError) -> Self {
        RegistryError::ResolutionFailed {
            url: url.into(),
            source,
        }
    }

    /// HTTP status and stable error code for the wire
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            RegistryError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            RegistryError::ResolutionFailed { .. } => (StatusCode::BAD_GATEWAY, "RESOLUTION_FAILED"),
            RegistryError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            RegistryError::RegistryUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "REGISTRY_UNAVAILABLE")
            }
            RegistryError::ConfigError(_) | RegistryError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<config::ConfigError> for RegistryError {
    fn from(err: config::ConfigError) -> Self {
        RegistryError::ConfigError(err.to_string())
    }
}

/// Underlying cause of a card resolution failure.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed agent card: {0}")]
    Malformed(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
