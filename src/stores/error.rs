//! Error types for store operations

use std::fmt;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur when talking to the device or alert store
#[derive(Debug)]
pub enum StoreError {
    /// The requested row does not exist
    NotFound(String),

    /// The mutation conflicts with the row's lifecycle state
    /// (e.g. acknowledging an already-resolved alert)
    Conflict(String),

    /// The backend is temporarily unreachable; the caller may retry
    Unavailable(String),

    /// Any other backend failure
    Backend(String),
}

impl StoreError {
    /// Transient failures are retried on the next monitoring pass rather
    /// than surfaced to operators.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "not found: {}", what),
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
