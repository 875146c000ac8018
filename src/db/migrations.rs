//! Embedded schema migrations.
//!
//! diesel_migrations needs a synchronous connection, so every entry point
//! opens a `PgConnection` on the blocking thread pool.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Names of migrations that have not been applied yet.
pub async fn pending_migrations(database_url: String) -> AppResult<Vec<String>> {
    with_connection(database_url, |conn| {
        let pending = conn.pending_migrations(MIGRATIONS).map_err(|e| AppError::Database {
            operation: "check pending migrations".to_string(),
            source: anyhow::anyhow!("Migration error: {}", e),
        })?;
        Ok(pending.iter().map(|m| m.name().to_string()).collect())
    })
    .await
}

/// Applies every pending migration and returns the applied versions.
pub async fn run_pending_migrations(database_url: String) -> AppResult<Vec<String>> {
    with_connection(database_url, |conn| {
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::Database {
                operation: "run pending migrations".to_string(),
                source: anyhow::anyhow!("Migration error: {}", e),
            })?;
        Ok(applied.iter().map(|m| m.to_string()).collect())
    })
    .await
}

/// Reverts the last `steps` migrations, newest first.
pub async fn revert_migrations(database_url: String, steps: u32) -> AppResult<Vec<String>> {
    with_connection(database_url, move |conn| {
        let mut reverted = Vec::new();
        for _ in 0..steps {
            match conn.revert_last_migration(MIGRATIONS) {
                Ok(version) => reverted.push(version.to_string()),
                Err(e) if reverted.is_empty() => {
                    return Err(AppError::Database {
                        operation: "revert migration".to_string(),
                        source: anyhow::anyhow!("Migration error: {}", e),
                    });
                }
                // Nothing left to revert
                Err(_) => break,
            }
        }
        Ok(reverted)
    })
    .await
}

async fn with_connection<T, F>(database_url: String, work: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url).map_err(|e| AppError::Database {
            operation: "establish connection for migrations".to_string(),
            source: anyhow::anyhow!("Connection error: {}", e),
        })?;
        work(&mut conn)
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })?
}
