//! Logger built on `tracing-subscriber`.
//!
//! - Console output with color control
//! - File output in full, compact or JSON format
//! - Size-based file rotation with optional gzip compression
//! - Fallback to stderr when the log file becomes unwritable

pub mod config;
pub mod error;
pub mod rotation;
pub(crate) mod writer;


pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig};
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};
use writer::RotatingFileWriter;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Installs the global subscriber described by `config`.
///
/// Fails if the configuration is invalid, the log file cannot be opened,
/// or a global subscriber is already installed.
pub fn init_logger(config: LoggerConfig) -> Result<(), LoggerError> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LoggerError::config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    // The file layer goes first so console ANSI settings never leak into
    // file output (tokio-rs/tracing#1817).
    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.file.enabled {
        layers.push(file_layer(&config.file)?);
    }
    if config.console.enabled {
        layers.push(console_layer(&config.console));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggerError::Init {
            message: e.to_string(),
        })
}

fn console_layer(config: &ConsoleConfig) -> BoxedLayer {
    let use_ansi = config.colored && std::io::stdout().is_terminal();
    fmt::layer()
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
        .boxed()
}

fn file_layer(config: &FileConfig) -> Result<BoxedLayer, LoggerError> {
    let writer = RotatingFileWriter::new(config)?;

    let layer = match config.format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    };
    Ok(layer)
}
