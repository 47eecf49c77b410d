//! Error types for the server.

use axum::http::StatusCode;
use datahub_store::StoreError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors surfaced at the request boundary.
#[derive(Error, Debug)]
pub enum ServerError {
    /// No entry exists for the location.
    #[error("location not found: {0}")]
    NotFound(String),

    /// The store refused the write for lack of capacity.
    #[error("storage full: {used} of {max} bytes in use")]
    StorageFull {
        /// Accounted bytes in use.
        used: u64,
        /// Capacity ceiling.
        max: u64,
    },

    /// The supplied identifier is not a well-formed UUID.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// The location id failed validation.
    #[error("invalid location id: {0}")]
    InvalidLocation(String),

    /// The request body could not be decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request did not finish within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::KeyNotFound { key } => ServerError::NotFound(key),
            StoreError::InsufficientCapacity { used, max } => {
                ServerError::StorageFull { used, max }
            }
        }
    }
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::NotFound(_)
                | ServerError::InvalidId(_)
                | ServerError::InvalidLocation(_)
                | ServerError::InvalidRequest(_)
                | ServerError::Timeout
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ServerError::StorageFull { .. } | ServerError::Internal(_) | ServerError::Io(_)
        )
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::StorageFull { .. } => StatusCode::INSUFFICIENT_STORAGE,
            ServerError::InvalidId(_)
            | ServerError::InvalidLocation(_)
            | ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::Internal(_) | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, client-facing description. Internal details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            ServerError::NotFound(_) => "Location ID not found",
            ServerError::StorageFull { .. } => "Insufficient storage",
            ServerError::InvalidId(_) => "Invalid UUID format",
            ServerError::InvalidLocation(_) => "Invalid location ID",
            ServerError::InvalidRequest(_) => "Invalid request body",
            ServerError::Timeout => "Request timed out",
            ServerError::Internal(_) | ServerError::Io(_) => "Internal server error",
        }
    }
}
