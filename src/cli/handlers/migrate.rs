//! Migrate command handler
//!
//! Migrations only exist for the PostgreSQL backend.

use crate::config::settings::{Settings, StorageBackend};
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::{AppError, AppResult};

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Applies pending migrations, lists them (`dry_run`) or reverts the
    /// newest `rollback` of them.
    ///
    /// # Errors
    /// - Storage backend is not `postgres`
    /// - Database connection or migration errors
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        if self.config.storage.backend != StorageBackend::Postgres {
            return Err(AppError::Validation {
                field: "storage.backend".to_string(),
                reason: format!(
                    "Migrations require the postgres backend, configured backend is '{}'",
                    self.config.storage.backend.as_str()
                ),
            });
        }
        if rollback == Some(0) {
            return Err(AppError::Validation {
                field: "rollback_steps".to_string(),
                reason: "Number of rollback steps must be greater than 0".to_string(),
            });
        }
        self.config.database.validate()?;

        let database_url = self.config.database.url.clone();
        match (dry_run, rollback) {
            (true, _) => {
                println!("Checking for pending migrations...");
                let pending = pending_migrations(database_url).await?;
                if pending.is_empty() {
                    println!("✓ No pending migrations found - database is up to date");
                } else {
                    println!("Found {} pending migration(s):", pending.len());
                    for name in &pending {
                        println!("  - {name}");
                    }
                    println!("\nRun without --dry-run to apply these migrations");
                }
            }
            (false, Some(steps)) => {
                println!("Rolling back {steps} migration(s)...");
                let reverted = revert_migrations(database_url, steps).await?;
                println!("✓ Rolled back {} migration(s)", reverted.len());
                for version in &reverted {
                    println!("  - {version}");
                }
            }
            (false, None) => {
                println!("Running database migrations...");
                let applied = run_pending_migrations(database_url).await?;
                if applied.is_empty() {
                    println!("✓ No migrations to apply - database is already up to date");
                } else {
                    println!("✓ Applied {} migration(s):", applied.len());
                    for version in &applied {
                        println!("  - {version}");
                    }
                }
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
