//! Fetch error types.
//!
//! Every failure of a single fetch maps to exactly one [`FetchError`]
//! variant. Errors are `Clone` because one in-flight fetch resolves every
//! caller that joined it with the same outcome.

use std::fmt;
use thiserror::Error;

/// The category of a fetch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The API answered with a non-200 status.
    ApiStatus,
    /// The API answered with an empty result list.
    NoData,
    /// The request did not complete in time.
    Timeout,
    /// Connection, DNS, TLS or body transfer failure.
    Transport,
    /// The body is not the expected JSON shape.
    Schema,
}

impl FetchErrorKind {
    /// Returns true if the next scheduled attempt may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ApiStatus | Self::Timeout | Self::Transport)
    }

    /// Returns a stable identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiStatus => "api_status",
            Self::NoData => "no_data",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Schema => "schema",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Non-200 HTTP status.
    #[error("API returned status {code}")]
    ApiStatus { code: u16 },

    /// The result list was empty.
    #[error("no data received from API")]
    NoData,

    /// The request timed out.
    #[error("timeout fetching school holiday data")]
    Timeout,

    /// The request failed below HTTP.
    #[error("error communicating with API: {cause}")]
    Transport { cause: String },

    /// A required field is missing or malformed.
    #[error("unexpected API response: invalid or missing field {field:?}")]
    Schema { field: String },
}

impl FetchError {
    /// Creates a transport error.
    pub fn transport(cause: impl fmt::Display) -> Self {
        Self::Transport {
            cause: cause.to_string(),
        }
    }

    /// Creates a schema error for the named field.
    pub fn schema(field: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::ApiStatus { .. } => FetchErrorKind::ApiStatus,
            Self::NoData => FetchErrorKind::NoData,
            Self::Timeout => FetchErrorKind::Timeout,
            Self::Transport { .. } => FetchErrorKind::Transport,
            Self::Schema { .. } => FetchErrorKind::Schema,
        }
    }

    /// Maps a reqwest failure onto the taxonomy.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::transport(err)
        }
    }
}

/// A specialized Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mapping() {
        assert_eq!(
            FetchError::ApiStatus { code: 500 }.kind(),
            FetchErrorKind::ApiStatus
        );
        assert_eq!(FetchError::NoData.kind(), FetchErrorKind::NoData);
        assert_eq!(FetchError::Timeout.kind(), FetchErrorKind::Timeout);
        assert_eq!(
            FetchError::transport("refused").kind(),
            FetchErrorKind::Transport
        );
        assert_eq!(
            FetchError::schema("end_date").kind(),
            FetchErrorKind::Schema
        );
    }

    #[test]
    fn retryable_kinds() {
        assert!(FetchErrorKind::Timeout.is_retryable());
        assert!(FetchErrorKind::Transport.is_retryable());
        assert!(FetchErrorKind::ApiStatus.is_retryable());
        assert!(!FetchErrorKind::NoData.is_retryable());
        assert!(!FetchErrorKind::Schema.is_retryable());
    }

    #[test]
    fn display() {
        assert_eq!(
            FetchError::ApiStatus { code: 503 }.to_string(),
            "API returned status 503"
        );
        assert_eq!(
            FetchError::schema("zones").to_string(),
            "unexpected API response: invalid or missing field \"zones\""
        );
        assert_eq!(FetchErrorKind::NoData.to_string(), "no_data");
    }
}
