//! Custom error types for the Lara client

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the Lara client
#[derive(Error, Debug)]
pub enum LaraError {
    /// The server answered with a non-2xx status and an error envelope
    #[error("[HTTP {status}] {error_type}: {message}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Server-declared error type, "UnknownError" when absent
        error_type: String,
        /// Server-declared error message
        message: String,
        /// Optional structured details attached by the server
        details: Option<Value>,
    },

    /// A polling deadline elapsed before the operation completed
    #[error("Operation timed out")]
    Timeout,

    /// A success-status response carried a body that could not be decoded
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// What failed to decode
        message: String,
    },

    /// Client-side input validation failed, nothing was sent over the wire
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was rejected
        message: String,
    },

    /// IO error while resolving a file attachment
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network-level failure, propagated from the HTTP client unchanged
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LaraError {
    /// Status code of an API error, `None` for every other kind
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LaraError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for Lara client operations
pub type Result<T> = std::result::Result<T, LaraError>;
