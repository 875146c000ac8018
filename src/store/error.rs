//! Storage error types.

use thiserror::Error;

/// Errors raised by a [`super::UserStore`] backend.
///
/// Absence of a user is not an error at this layer; lookups report it
/// through `Option` and `bool` results.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User '{user}' already exists")]
    Duplicate { user: String },

    #[error("Storage operation failed: {operation}")]
    Backend {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Storage connection unavailable")]
    Pool {
        #[source]
        source: anyhow::Error,
    },
}

impl StoreError {
    pub fn backend(operation: impl Into<String>, source: impl std::fmt::Display) -> Self {
        StoreError::Backend {
            operation: operation.into(),
            source: anyhow::anyhow!("{}", source),
        }
    }

    pub fn pool(source: impl std::fmt::Display) -> Self {
        StoreError::Pool {
            source: anyhow::anyhow!("{}", source),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
