//! Client error handling

use thiserror::Error;

/// Errors surfaced to callers of the dispatcher
#[derive(Error, Debug)]
pub enum ClientError {
    /// The batch POST failed as a whole; every caller in that batch gets this
    #[error("Batch request failed: {0}")]
    BatchFailed(String),

    /// The server declared this sub-request failed
    #[error("{0}")]
    Request(String),

    /// The batch response carried no result for this request's id
    #[error("Result not found in batch response")]
    ResultNotFound,

    /// Non-2xx response to an HTTP call
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Connection, TLS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// A response body that could not be decoded
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Converting request or response data failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The batch carrying this request was dropped before completing
    #[error("Request cancelled before a result was received")]
    Cancelled,
}

/// Client result type
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Failure of the HTTP exchange itself rather than of the requested operation
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::BatchFailed(_) | ClientError::Network(_) => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Errors worth another attempt of the same HTTP call
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
