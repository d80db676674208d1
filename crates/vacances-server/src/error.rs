//! Server error types.

use thiserror::Error;

use vacances_api::FetchError;
use vacances_core::ConfigError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while managing entries.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The entry configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The first refresh of an entry failed; the host should retry setup later.
    #[error("Entry {entry} not ready: {source}")]
    NotReady { entry: String, source: FetchError },

    /// An entry with the same id is already set up.
    #[error("Entry already set up: {id}")]
    DuplicateEntry { id: String },

    /// No entry with this id is set up.
    #[error("Unknown entry: {id}")]
    UnknownEntry { id: String },

    /// The HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    Client(FetchError),
}

impl ServerError {
    /// Creates a not-ready error.
    pub fn not_ready(entry: impl Into<String>, source: FetchError) -> Self {
        Self::NotReady {
            entry: entry.into(),
            source,
        }
    }

    /// Creates a duplicate entry error.
    pub fn duplicate_entry(id: impl Into<String>) -> Self {
        Self::DuplicateEntry { id: id.into() }
    }

    /// Creates an unknown entry error.
    pub fn unknown_entry(id: impl Into<String>) -> Self {
        Self::UnknownEntry { id: id.into() }
    }

    /// Returns true if retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotReady { source, .. } => source.kind().is_retryable(),
            _ => false,
        }
    }
}
