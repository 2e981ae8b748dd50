//! Error type for backend API calls.

use thiserror::Error;

/// Errors that can occur when fetching a snapshot from the PulseCheck API.
///
/// The polling layer does not distinguish retryable from fatal errors; every
/// variant is collapsed into a single message string on the resource state
/// and the next scheduled fetch proceeds regardless.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Could not connect to the backend.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Backend returned a non-success status code.
    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Any other HTTP-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }
}
