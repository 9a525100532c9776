//! Store error types.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::store::KeyValueStore) backend.
///
/// Validation failures are never reported through this type; they land in the
/// form's error map instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Backend(String),

    #[error("failed to encode session value")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// Wrap any backend failure message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
