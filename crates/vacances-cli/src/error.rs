//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

use vacances_api::FetchError;
use vacances_core::{ConfigError, TracingError};
use vacances_server::ServerError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the expected layout.
    #[error("failed to parse config {}: {source}", path.display())]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A configuration value is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Anything else wrong with the configuration as a whole.
    #[error("configuration error: {0}")]
    Invalid(String),

    /// Entry management failed.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// A one-shot fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Logging could not be set up.
    #[error("failed to initialize logging: {0}")]
    Tracing(#[from] TracingError),

    /// Output could not be produced.
    #[error("output error: {0}")]
    Output(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Creates an invalid configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
