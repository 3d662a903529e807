//! Error types for composer-rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for composer operations
pub type Result<T> = std::result::Result<T, ComposerError>;

/// Direction of a conversion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionDirection {
    /// HTML string to template document
    HtmlToJson,
    /// Template document to HTML string
    JsonToHtml,
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionDirection::HtmlToJson => f.write_str("html-to-json"),
            ConversionDirection::JsonToHtml => f.write_str("json-to-html"),
        }
    }
}

/// Composer error types
#[derive(Error, Debug)]
pub enum ComposerError {
    /// Auth service rejected the request or was unreachable
    #[error("Failed to authenticate with the editor auth service: {0}")]
    Auth(String),

    /// Client identity secrets or API keys are not configured
    #[error("Missing credentials configuration: {0}")]
    MissingCredentialsConfig(String),

    /// Conversion service failure
    #[error("Conversion {direction} failed: {diagnostic}")]
    ConversionFailed {
        direction: ConversionDirection,
        diagnostic: String,
    },

    /// A required request field is absent or invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// Mail transport failure
    #[error("Failed to send test email: {0}")]
    Send(String),

    /// Unknown scenario, row fragment, template, session or preview
    #[error("Not found: {id}")]
    NotFound { id: String },

    /// A display condition with an empty or missing marker
    #[error("Malformed directive in row '{row_name}': before and after must both be non-empty")]
    MalformedDirective { row_name: String },

    /// External call exceeded its configured timeout
    #[error("Timed out waiting for {service}")]
    Timeout { service: String },

    /// Session reached its terminal state and must be reinitialized
    #[error("Session {0} has failed and must be reinitialized")]
    SessionFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ComposerError {
    /// Create a not-found error for an identifier
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            ComposerError::Validation(_) => StatusCode::BAD_REQUEST,
            ComposerError::NotFound { .. } => StatusCode::NOT_FOUND,
            ComposerError::MalformedDirective { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ComposerError::SessionFailed(_) => StatusCode::CONFLICT,
            ComposerError::Auth(_)
            | ComposerError::ConversionFailed { .. }
            | ComposerError::Send(_) => StatusCode::BAD_GATEWAY,
            ComposerError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ComposerError::MissingCredentialsConfig(_)
            | ComposerError::Config(_)
            | ComposerError::Io(_)
            | ComposerError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, stable error summary for API responses
    fn summary(&self) -> String {
        match self {
            ComposerError::Auth(_) => "Failed to authenticate with the editor".to_string(),
            ComposerError::ConversionFailed { direction, .. } => {
                format!("Conversion {} failed", direction)
            }
            ComposerError::Send(_) => "Failed to send test email".to_string(),
            other => other.to_string(),
        }
    }

    /// Upstream diagnostic payload, passed through verbatim
    fn details(&self) -> Option<String> {
        match self {
            ComposerError::Auth(details) | ComposerError::Send(details) => Some(details.clone()),
            ComposerError::ConversionFailed { diagnostic, .. } => Some(diagnostic.clone()),
            _ => None,
        }
    }
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ComposerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = ApiError {
            error: self.summary(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}
