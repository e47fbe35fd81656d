//! Error types for the backend client

use thiserror::Error;

/// Errors that can occur when talking to the todo backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Unauthorized - missing or expired bearer token
    #[error("Unauthorized - invalid or expired token")]
    Unauthorized,

    /// Backend answered with a status the operation does not accept
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },
}
