//! Command line interface for warden-rs
//!
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command handlers for serve and migrate

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::config::settings::Settings;
use crate::logger::init_logger;

/// Loads configuration and applies the CLI overrides on top.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::load(cli.config.as_deref(), cli.env.map(Into::into))
        .context("Failed to load configuration")?;

    merger
        .merge_cli_args(cli)
        .context("Invalid configuration after applying command line overrides")
}

/// Installs the global subscriber described by `settings.logger`.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Invalid logger configuration")?;

    init_logger(logger_config).context("Failed to initialize logger")
}
