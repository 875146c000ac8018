//! Serve command handler

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Runs the server until shutdown, or only checks the configuration
    /// when `dry_run` is set.
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.config).run().await?;
        Ok(())
    }

    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Storage backend: {}",
            self.config.storage.backend.as_str()
        );
        if self.config.bootstrap.enabled {
            println!(
                "✓ Bootstrap user '{}' is created when the store is empty",
                self.config.bootstrap.user
            );
        }
        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
