//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// User account service speaking the `/_api/user` protocol
#[derive(Parser, Debug)]
#[command(name = "warden-rs")]
#[command(about = "User account service speaking the /_api/user protocol")]
#[command(long_about = "
Warden-rs serves the /_api/user resource: create, read, replace, update and
delete user accounts, and check credentials against a password cache that is
rebuilt after every successful change.

EXAMPLES:
    # Start the server with default configuration
    warden-rs serve

    # Start server on custom host and port
    warden-rs serve --host 0.0.0.0 --port 8529

    # Use a single configuration file
    warden-rs --config /etc/warden/warden.toml serve

    # Load config/production.toml on top of config/default.toml
    warden-rs --env production serve

    # Check configuration without starting server
    warden-rs serve --dry-run

    # Apply or preview PostgreSQL migrations
    warden-rs migrate
    warden-rs migrate --dry-run

    # Roll back the last migration
    warden-rs migrate --rollback 1
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Read only this TOML file (plus WARDEN_* variables) instead of the
    /// layered config directory. The file must exist and be readable.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects the `{environment}.toml` layer, taking precedence over WARDEN_APP_ENV.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    ///
    /// Examples:
    ///   warden-rs serve                            # Start with defaults
    ///   warden-rs serve --host 0.0.0.0 --port 80   # Bind to all interfaces on port 80
    ///   warden-rs serve --dry-run                  # Validate config without starting
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        ///
        /// Default: 8529
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        ///
        /// Takes precedence over the configuration file and --verbose/--quiet.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// PostgreSQL schema migrations
    ///
    /// Only meaningful when `storage.backend = "postgres"`.
    ///
    /// Examples:
    ///   warden-rs migrate                    # Apply all pending migrations
    ///   warden-rs migrate --dry-run          # Show pending migrations without applying
    ///   warden-rs migrate --rollback 1       # Roll back the last migration
    Migrate {
        /// Show pending migrations without applying
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of migrations to roll back (1-100)
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Checks argument combinations clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(Commands::Migrate { dry_run, rollback }) = &self.command
            && *dry_run
            && rollback.is_some()
        {
            return Err("Cannot use --dry-run and --rollback together".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["warden-rs", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["warden-rs", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = Cli::try_parse_from(["warden-rs"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.env.is_none());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "warden-rs", "serve", "--host", "0.0.0.0", "--port", "8080", "--log-level", "warning",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Serve {
                host,
                port,
                log_level,
                dry_run,
            }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert_eq!(log_level, Some(LogLevel::Warn));
                assert!(!dry_run);
            }
            other => panic!("Expected Serve command, got {other:?}"),
        }
    }

    #[test]
    fn test_serve_rejects_port_zero() {
        assert!(Cli::try_parse_from(["warden-rs", "serve", "--port", "0"]).is_err());
    }

    #[test]
    fn test_migrate_command() {
        let cli = Cli::try_parse_from(["warden-rs", "migrate", "--dry-run"]).unwrap();
        match cli.command {
            Some(Commands::Migrate { dry_run, rollback }) => {
                assert!(dry_run);
                assert!(rollback.is_none());
            }
            other => panic!("Expected Migrate command, got {other:?}"),
        }
    }

    #[test]
    fn test_migrate_dry_run_conflicts_with_rollback() {
        let err = Cli::try_parse_from(["warden-rs", "migrate", "--dry-run", "--rollback", "1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_env_aliases() {
        let cli = Cli::try_parse_from(["warden-rs", "--env", "prod"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Production));
        assert_eq!(
            crate::config::Environment::from(Environment::Staging),
            crate::config::Environment::Staging
        );
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["warden-rs", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
