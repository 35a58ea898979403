//! Store error definitions.

use thiserror::Error;

/// Errors surfaced by a record store.
///
/// Messages from the store are carried verbatim; the store is trusted
/// infrastructure and its text is shown to callers as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No row matches the requested identifier.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness constraint (email) was violated.
    #[error("{0}")]
    Conflict(String),

    /// The store rejected the operation for any other reason.
    #[error("{0}")]
    Backend(String),

    /// The store could not be reached or its reply could not be read.
    #[error("Store request failed: {0}")]
    Transport(String),

    /// A store handle could not be opened for this request.
    #[error("Store connection error: {0}")]
    Connection(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}
