use thiserror::Error;

use crate::api::resource::RouteTableError;
use crate::config::error::ConfigError;
use crate::store::StoreError;

/// Process-level error type used by the CLI, startup and migration paths.
///
/// Request handling never surfaces this type: the user resource speaks
/// [`crate::services::UserError`] and renders its own responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid argument or setting with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Database operation error with operation context
    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::ValidationError { field, message } => AppError::Validation {
                field,
                reason: message,
            },
            other => AppError::Configuration {
                key: "settings".to_string(),
                source: anyhow::Error::new(other),
            },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        AppError::Database {
            operation: "user store".to_string(),
            source: anyhow::Error::new(error),
        }
    }
}

impl From<RouteTableError> for AppError {
    fn from(error: RouteTableError) -> Self {
        AppError::Internal {
            source: anyhow::Error::new(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
