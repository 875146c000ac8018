//! Configuration loader for warden-rs
//!
//! [`ConfigLoader`] loads configuration from multiple sources with proper
//! precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
pub const CONFIG_DIR_ENV: &str = "WARDEN_CONFIG_DIR";

/// Environment variable for a single configuration file
pub const CONFIG_FILE_ENV: &str = "WARDEN_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "WARDEN";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Loads [`Settings`] from layered TOML files and `WARDEN_*` variables.
///
/// Sources, lowest priority first:
/// 1. `default.toml` (required)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `WARDEN_*` environment variables
///
/// In single-file mode only that file and the environment variables are read.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `WARDEN_CONFIG_DIR`, `WARDEN_CONFIG_FILE` and
    /// `WARDEN_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `WARDEN_CONFIG_DIR` and `WARDEN_CONFIG_FILE`
    /// are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir_env = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir_env.is_some() {
            return Err(ConfigError::mutual_exclusivity(format!(
                "{CONFIG_DIR_ENV} and {CONFIG_FILE_ENV} cannot both be set. \
                 Use {CONFIG_DIR_ENV} for layered configuration or \
                 {CONFIG_FILE_ENV} for a single configuration file."
            )));
        }

        Ok(Self {
            config_dir: config_dir_env
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Switch to single-file mode, overriding any environment setting.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Select the `{environment}.toml` layer explicitly.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` or the single configuration file is not found
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load without validation, for callers that apply further overrides first.
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match &self.config_file {
            Some(config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // WARDEN_SERVER__PORT -> server.port
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = Self::add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        Self::add_file_source(builder, &local_path, false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let name = path.to_str().ok_or_else(|| {
            ConfigError::ParseError(format!("Configuration path is not UTF-8: {}", path.display()))
        })?;
        Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
    }

    /// `WARDEN_` variables map onto nested keys with `__` as the separator.
    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::settings::StorageBackend;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serializes tests that touch process environment variables.
    pub(crate) static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const BASE_CONFIG: &str = r#"
[application]
name = "test-app"
version = "1.0.0"

[server]
host = "127.0.0.1"
port = 3000
request_timeout = 30

[database]
url = "postgres://localhost/test"
max_connections = 10
min_connections = 1

[logger]
level = "info"
"#;

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Restores touched environment variables on drop.
    pub(crate) struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        pub(crate) fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        pub(crate) fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        pub(crate) fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }

        /// Clears every variable the loader reads.
        pub(crate) fn clean() -> Self {
            let mut env = Self::new();
            let keys: Vec<String> = std::env::vars()
                .map(|(key, _)| key)
                .filter(|key| key.starts_with("WARDEN_"))
                .collect();
            for key in keys {
                env.remove(&key);
            }
            env
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_config_loader_new_default() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _env = EnvGuard::clean();

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file().is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_config_loader_reads_env() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::clean();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set("WARDEN_APP_ENV", "production");

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("/custom/config"));
        assert_eq!(loader.environment(), AppEnvironment::Production);
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::clean();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/path/to/config.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains(CONFIG_DIR_ENV));
                assert!(msg.contains(CONFIG_FILE_ENV));
            }
            other => panic!("Expected MutualExclusivityError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_default_toml() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let result = ConfigLoader::new().unwrap().load();
        match result {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_full_precedence_chain() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::clean();

        let development_config = r#"
[application]
name = "dev-app"

[server]
port = 3001

[database]
url = "postgres://dev/db"
"#;
        let local_config = r#"
[server]
port = 3002

[database]
url = "postgres://local/db"
"#;
        let temp_dir = setup_config_dir(&[
            ("default.toml", BASE_CONFIG),
            ("development.toml", development_config),
            ("local.toml", local_config),
        ]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("WARDEN_SERVER__PORT", "3003");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");

        // env var > local.toml > development.toml > default.toml
        assert_eq!(settings.server.port, 3003);
        assert_eq!(settings.database.url, "postgres://local/db");
        assert_eq!(settings.application.name, "dev-app");
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.application.version, "1.0.0");
    }

    #[test]
    fn test_load_with_explicit_environment() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::clean();

        let production_config = r#"
[server]
host = "0.0.0.0"

[storage]
backend = "postgres"

[bootstrap]
enabled = false
"#;
        let temp_dir = setup_config_dir(&[
            ("default.toml", BASE_CONFIG),
            ("production.toml", production_config),
        ]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new()
            .unwrap()
            .with_environment(AppEnvironment::Production)
            .load()
            .expect("Should load settings");

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.storage.backend, StorageBackend::Postgres);
        assert!(!settings.bootstrap.enabled);
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_env_override_of_nested_keys() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[("default.toml", BASE_CONFIG)]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("WARDEN_STORAGE__BACKEND", "postgres");
        env.set("WARDEN_DATABASE__URL", "postgres://env-override/db");
        env.set("WARDEN_LOGGER__FILE__ROTATION__COMPRESS", "true");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");
        assert_eq!(settings.storage.backend, StorageBackend::Postgres);
        assert_eq!(settings.database.url, "postgres://env-override/db");
        assert!(settings.logger.file.rotation.compress);
    }

    #[test]
    fn test_load_single_file_mode() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[("single.toml", "[server]\nport = 5000\n")]);

        let settings = ConfigLoader::new()
            .unwrap()
            .with_config_file(temp_dir.path().join("single.toml"))
            .load()
            .expect("Should load settings");

        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.application.name, "warden-rs");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[("bad.toml", "[server]\nport = 0\n")]);

        let loader = ConfigLoader::new()
            .unwrap()
            .with_config_file(temp_dir.path().join("bad.toml"));
        assert!(matches!(
            loader.load(),
            Err(ConfigError::ValidationError { field, .. }) if field == "server.port"
        ));
        assert!(loader.load_unvalidated().is_ok());
    }

    #[test]
    fn test_repository_config_files_load() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::clean();
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/config");
        env.set(CONFIG_DIR_ENV, dir);
        env.set("WARDEN_DATABASE__URL", "postgres://localhost/warden");

        for environment in [AppEnvironment::Development, AppEnvironment::Production] {
            let settings = ConfigLoader::new()
                .unwrap()
                .with_environment(environment)
                .load()
                .expect("Shipped configuration should be valid");
            assert_eq!(settings.application.name, "warden-rs");
        }
    }
}
