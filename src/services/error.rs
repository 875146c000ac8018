//! Error type returned by the users service.

use thiserror::Error;

use crate::error::ErrorNum;
use crate::store::StoreError;

/// Outcome of a failed users-service operation.
///
/// `NotFound` is the only variant the HTTP resource interprets; everything
/// else is reported as an exception.
#[derive(Error, Debug)]
pub enum UserError {
    #[error("User '{user}' not found")]
    NotFound { user: String },

    #[error("Invalid user name '{user}': {reason}")]
    InvalidName { user: String, reason: String },

    #[error("User '{user}' already exists")]
    Duplicate { user: String },

    #[error("Invalid parameter {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Password hashing failed")]
    Hashing {
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Store(StoreError),
}

impl UserError {
    pub fn not_found(user: impl Into<String>) -> Self {
        UserError::NotFound { user: user.into() }
    }

    pub fn invalid_parameter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        UserError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Number reported in the `errorNum` field for this error.
    pub fn error_num(&self) -> ErrorNum {
        match self {
            UserError::NotFound { .. } => ErrorNum::UserNotFound,
            UserError::InvalidName { .. } => ErrorNum::UserInvalidName,
            UserError::Duplicate { .. } => ErrorNum::UserDuplicate,
            UserError::InvalidParameter { .. } => ErrorNum::BadParameter,
            UserError::Hashing { .. } | UserError::Store(_) => ErrorNum::Internal,
        }
    }

    /// Whether the message may leak backend detail and must not be shown to clients.
    pub fn is_internal(&self) -> bool {
        matches!(self, UserError::Hashing { .. } | UserError::Store(_))
    }
}

impl From<StoreError> for UserError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate { user } => UserError::Duplicate { user },
            other => UserError::Store(other),
        }
    }
}

pub type UserResult<T> = Result<T, UserError>;
