//! Request errors and the HTTP statuses they map to.

use hyper::StatusCode;
use latencyglobe_types::RangeParseError;
use serde::Serialize;
use thiserror::Error;

/// Why a request could not be answered.
///
/// Upstream failures are not represented: they degrade to "no data"
/// rather than failing the request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The Radar token is not configured. Fatal, never retried.
    #[error("Cloudflare API token is not configured: set the {env} environment variable")]
    MissingToken { env: String },

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error(transparent)]
    InvalidRange(#[from] RangeParseError),

    #[error("missing required query parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("invalid query parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("no route for {0}")]
    NotFound(String),

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingToken { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnknownRegion(_)
            | ApiError::InvalidRange(_)
            | ApiError::MissingParameter(_)
            | ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// The JSON body sent for this error.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
