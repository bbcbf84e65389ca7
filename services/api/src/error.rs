//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and its
//! mapping onto HTTP responses. Every variant is terminal at the API
//! boundary: a fixed status code, a stable machine-readable reason code,
//! and a human-readable message. No partial responses are ever emitted.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::config::ConfigError;
use venture_lens_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad caller input; the message names the violated constraint.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Missing or invalid credential on a route that requires one.
    #[error("Unauthorized")]
    Unauthorized,

    /// Valid credential, but the resource belongs to someone else.
    #[error("Forbidden")]
    Forbidden,

    /// No matching record for the resolved identity.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate account email.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The external model or the storage write failed during analysis.
    /// Callers get one error for both; internal logs keep the distinction.
    #[error("Analysis unavailable")]
    AnalysisUnavailable,

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, field: Option<&str>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    /// The stable reason code exposed on the wire for this variant.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_failed",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::AnalysisUnavailable => "analysis_unavailable",
            ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::AnalysisUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The JSON body every error response carries.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = self.reason();

        let (message, field) = match &self {
            ApiError::Validation { message, field } => (message.clone(), field.clone()),
            ApiError::Unauthorized => ("Invalid or missing credentials".to_string(), None),
            ApiError::Forbidden => ("You do not have access to this resource".to_string(), None),
            ApiError::NotFound(what) => (what.clone(), None),
            ApiError::Conflict(what) => (what.clone(), None),
            ApiError::AnalysisUnavailable => (
                "Analysis is temporarily unavailable, please try again".to_string(),
                None,
            ),
            // Internal detail never leaves the process; it is logged instead.
            other => {
                tracing::error!("internal error: {other:?}");
                ("An internal server error occurred".to_string(), None)
            }
        };

        let body = ErrorBody {
            error: reason,
            message,
            field,
        };
        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => ApiError::NotFound(what),
            PortError::AlreadyExists(what) => ApiError::Conflict(what),
            PortError::Forbidden => ApiError::Forbidden,
            PortError::Unexpected(detail) => ApiError::Internal(detail),
        }
    }
}
