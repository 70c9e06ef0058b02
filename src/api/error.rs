//! Error types for the server API client.

use thiserror::Error;

/// Errors returned by [`crate::api::ServerApi`] implementations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    /// The configured bearer token cannot be sent as a header.
    #[error("API token is not a valid header value")]
    InvalidToken,

    /// The request URL could not be built.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete in time.
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
