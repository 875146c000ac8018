//! Database connection pool and schema migrations.
//!
//! Provides async PostgreSQL connection pooling using diesel_async with bb8,
//! plus embedded migrations applied through a blocking `PgConnection`.

mod migrations;
mod pool;

pub use migrations::{
    MIGRATIONS, pending_migrations, revert_migrations, run_pending_migrations,
};
pub use pool::{AsyncDbPool, establish_async_connection_pool};
