//! Service layer for business logic operations.
//!
//! Services encapsulate business rules and coordinate between the
//! storage layer and the HTTP resource.

mod credentials;
mod error;
mod user_service;

pub use credentials::CredentialCache;
pub use error::{UserError, UserResult};
pub use user_service::{AccountFields, UserDirectory, UserService};

use std::sync::Arc;

use crate::store::UserStore;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since every service shares its backing store.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
}

impl Services {
    /// Creates the services on top of a user store.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            users: UserService::new(store),
        }
    }
}
