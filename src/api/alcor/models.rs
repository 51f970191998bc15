use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which of the two market endpoints a request went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Tokens,
    Pools,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tokens => f.write_str("tokens"),
            Endpoint::Pools => f.write_str("pools"),
        }
    }
}

/// Error body some Alcor endpoints return alongside a failure status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Error type for market API operations. Every variant names the endpoint
/// so a failed refresh can say which request broke it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Non-success HTTP status
    #[error("{endpoint} endpoint ({url}) returned HTTP {status}: {message}")]
    Status {
        endpoint: Endpoint,
        url: String,
        status: u16,
        message: String,
    },
    /// Network/request error
    #[error("{endpoint} endpoint ({url}) request failed: {message}")]
    Request {
        endpoint: Endpoint,
        url: String,
        message: String,
    },
    /// Body was not the expected JSON
    #[error("{endpoint} endpoint ({url}) returned malformed JSON: {message}")]
    Deserialization {
        endpoint: Endpoint,
        url: String,
        message: String,
    },
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            ApiError::Status { endpoint, .. }
            | ApiError::Request { endpoint, .. }
            | ApiError::Deserialization { endpoint, .. } => Some(*endpoint),
            ApiError::Client(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
