//! Application state for Axum web framework.

use std::sync::Arc;

use crate::api::resource::{JsonResponder, RouteTableError, UserResource};
use crate::services::Services;
use crate::store::UserStore;

/// Shared state handed to every handler.
///
/// Cloning is cheap: everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Direct store access for health checks
    pub store: Arc<dyn UserStore>,
    pub user_resource: Arc<UserResource>,
}

impl AppState {
    /// Builds services and the user resource on top of a store.
    ///
    /// Fails only if the user route table is inconsistent.
    pub fn new(store: Arc<dyn UserStore>) -> Result<Self, RouteTableError> {
        let services = Services::new(store.clone());
        let user_resource = UserResource::new(
            Arc::new(services.users.clone()),
            Arc::new(JsonResponder),
        )?;

        Ok(Self {
            services,
            store,
            user_resource: Arc::new(user_resource),
        })
    }
}
