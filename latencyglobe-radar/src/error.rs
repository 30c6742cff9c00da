//! Error types for the Radar adapter.

use thiserror::Error;

/// Errors that can occur when fetching latency data from Radar.
#[derive(Debug, Error)]
pub enum RadarError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Response body was not valid JSON.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Token was rejected by the API.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Could not reach the API.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for RadarError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RadarError::Timeout
        } else if err.is_connect() {
            RadarError::Connection(err.to_string())
        } else if err.is_decode() {
            RadarError::Parse(err.to_string())
        } else {
            RadarError::Http(err.to_string())
        }
    }
}
