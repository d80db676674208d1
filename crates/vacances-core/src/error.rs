//! Configuration error types.
//!
//! These are raised while turning user configuration into a [`Query`](crate::Query)
//! and never reach the refresh coordinator.

use thiserror::Error;

/// Errors detected while validating an entry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The zone name is not one of the known school-holiday zones.
    #[error("unknown zone: {value:?}")]
    UnknownZone { value: String },

    /// A location query was configured without a location name.
    #[error("location must not be empty")]
    EmptyLocation,

    /// The poll interval must be at least one hour.
    #[error("invalid poll interval: {hours} hours (must be >= 1)")]
    InvalidInterval { hours: u32 },

    /// The configuration mode is neither `location` nor `zone`.
    #[error("unknown mode: {value:?} (expected \"location\" or \"zone\")")]
    UnknownMode { value: String },

    /// The API endpoint is not a valid URL.
    #[error("invalid API endpoint {endpoint:?}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

impl ConfigError {
    /// Creates an unknown zone error.
    pub fn unknown_zone(value: impl Into<String>) -> Self {
        Self::UnknownZone {
            value: value.into(),
        }
    }

    /// Creates an unknown mode error.
    pub fn unknown_mode(value: impl Into<String>) -> Self {
        Self::UnknownMode {
            value: value.into(),
        }
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ConfigError::unknown_zone("Zone Z").to_string(),
            "unknown zone: \"Zone Z\""
        );
        assert_eq!(
            ConfigError::InvalidInterval { hours: 0 }.to_string(),
            "invalid poll interval: 0 hours (must be >= 1)"
        );
        assert!(
            ConfigError::unknown_mode("city")
                .to_string()
                .contains("expected \"location\" or \"zone\"")
        );
    }
}
