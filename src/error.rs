//! Error types for clipfetch
//!
//! This module provides the error handling for the library:
//! - [`Error`], the crate-wide error returned by fallible operations
//! - [`FetchError`], failures surfaced by a media fetch engine
//! - HTTP status code mapping for the API layer
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for clipfetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for clipfetch
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied a request that cannot be accepted (missing url, bad JSON)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown job id or artifact
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress - not accepting new jobs
    #[error("shutdown in progress: not accepting new jobs")]
    ShuttingDown,
}

/// Failures reported by a [`MediaFetcher`](crate::fetcher::MediaFetcher)
///
/// These never reach the submitting caller. The job runner records the
/// display text into the job's `error` field.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The engine binary could not be started
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program that was executed
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Reading the engine's output failed
    #[error("failed to read engine output: {0}")]
    Io(#[from] std::io::Error),

    /// The engine ran and reported an error (network, format unavailable, decode, disk)
    #[error("{message}")]
    Engine {
        /// Last error line reported by the engine
        message: String,
        /// Process exit code, if the process exited normally
        exit_code: Option<i32>,
    },

    /// The engine finished without reporting where it wrote the artifact
    #[error("engine finished without reporting an output file")]
    MissingOutput,

    /// The engine produced a file name that cannot be served
    #[error("engine produced an unusable file name: {0}")]
    InvalidOutput(String),

    /// No fetch engine is available
    #[error("{0}")]
    NotSupported(String),
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "job 6f1c… not found",
///     "details": {
///       "resource": "job 6f1c…"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "invalid_request")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - caller-fixable input
            Error::InvalidRequest(_) => 400,
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::InvalidRequest(_) => "invalid_request",
            Error::NotFound(_) => "not_found",
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::NotFound(resource) => Some(serde_json::json!({
                "resource": resource,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
