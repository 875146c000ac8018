//! Merges CLI overrides on top of file and environment configuration.
//!
//! Precedence, highest first: command flags, global flags, `WARDEN_*`
//! variables, then the configuration files.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, settings::Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration, honouring `--config` and `--env`.
    ///
    /// The result is not validated yet: CLI overrides may still fix a value
    /// the files got wrong, so validation happens in [`Self::merge_cli_args`].
    pub fn load(
        config_path: Option<&Path>,
        environment: Option<Environment>,
    ) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = config_path {
            loader = loader.with_config_file(path);
        }
        if let Some(environment) = environment {
            loader = loader.with_environment(environment);
        }

        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Applies CLI overrides and validates the merged result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            // Command-level level beats --verbose/--quiet
            if let Some(level) = log_level {
                config.logger.level = (*level).into();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parser::Cli;
    use crate::config::loader::tests::{EnvGuard, TEST_MUTEX};
    use crate::config::settings::StorageBackend;
    use clap::Parser;
    use std::fs;

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(Settings::default()).merge_cli_args(&cli)
    }

    #[test]
    fn test_configuration_merger_new() {
        let base_config = Settings::default();
        let merger = ConfigurationMerger::new(base_config.clone());
        assert_eq!(merger.config(), &base_config);
    }

    #[test]
    fn test_verbose_and_quiet_flags() {
        assert_eq!(merge(&["warden-rs", "--verbose"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["warden-rs", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let merged = merge(&["warden-rs", "serve", "--host", "0.0.0.0", "--port", "9000"]).unwrap();
        assert_eq!(merged.server.host, "0.0.0.0");
        assert_eq!(merged.server.port, 9000);
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let merged = merge(&["warden-rs", "--verbose", "serve", "--log-level", "warn"]).unwrap();
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn test_cli_override_repairs_invalid_file_value() {
        let mut base = Settings::default();
        base.server.port = 0;
        let cli = Cli::try_parse_from(["warden-rs", "serve", "--port", "8529"]).unwrap();

        let merged = ConfigurationMerger::new(base).merge_cli_args(&cli).unwrap();
        assert_eq!(merged.server.port, 8529);
    }

    #[test]
    fn test_merged_result_is_validated() {
        let mut base = Settings::default();
        base.storage.backend = StorageBackend::Postgres;
        let cli = Cli::try_parse_from(["warden-rs"]).unwrap();

        let err = ConfigurationMerger::new(base).merge_cli_args(&cli).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. } if field == "database.url"));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _env = EnvGuard::clean();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        fs::write(&path, "[server]\nport = 7000\n\n[bootstrap]\nuser = \"admin\"\n").unwrap();

        let merger = ConfigurationMerger::load(Some(&path), None).unwrap();
        assert_eq!(merger.config().server.port, 7000);
        assert_eq!(merger.config().bootstrap.user, "admin");
    }
}
