//! Storage layer for user accounts.
//!
//! Two backends implement [`UserStore`]:
//! - `memory` - process-local map, the default and what the tests run against
//! - `postgres` - diesel_async with a bb8 connection pool

mod error;
mod memory;
mod postgres;
mod traits;

use std::sync::Arc;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use traits::UserStore;

use crate::config::settings::{Settings, StorageBackend};
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::error::AppResult;

/// Builds the store selected by `storage.backend`.
///
/// For PostgreSQL this opens the pool and, when `database.auto_migrate`
/// is set, applies pending migrations first.
pub async fn connect(settings: &Settings) -> AppResult<Arc<dyn UserStore>> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory user store");
            Ok(Arc::new(MemoryUserStore::new()))
        }
        StorageBackend::Postgres => {
            if settings.database.auto_migrate {
                let applied = run_pending_migrations(settings.database.url.clone()).await?;
                tracing::info!(count = applied.len(), "Applied pending migrations");
            }

            tracing::info!(
                max_connections = %settings.database.max_connections,
                min_connections = %settings.database.min_connections,
                "Initializing database connection pool"
            );
            let pool = establish_async_connection_pool(&settings.database).await?;
            Ok(Arc::new(PgUserStore::new(pool)))
        }
    }
}
