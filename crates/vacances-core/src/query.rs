//! Query types.
//!
//! A [`Query`] pairs an immutable [`QueryTarget`] (a location name or a zone)
//! with the user-tunable [`QueryOptions`]. [`EntryConfig`] is the serialized
//! form users write in their configuration; [`EntryConfig::validate`] is the
//! only way to turn it into a `Query`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::zone::Zone;

/// Default hours between two scheduled refreshes.
pub const DEFAULT_POLL_INTERVAL_HOURS: u32 = 12;

/// How a configuration selects its holiday calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum QueryMode {
    /// By academy/location name.
    Location,
    /// By school-holiday zone.
    Zone,
}

impl QueryMode {
    /// Returns the configuration keyword for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Zone => "zone",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "location" => Ok(Self::Location),
            "zone" => Ok(Self::Zone),
            _ => Err(ConfigError::unknown_mode(s)),
        }
    }
}

impl TryFrom<String> for QueryMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// What a query selects. Fixed for the lifetime of a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryTarget {
    Location(String),
    Zone(Zone),
}

impl QueryTarget {
    /// Returns the mode this target belongs to.
    pub fn mode(&self) -> QueryMode {
        match self {
            Self::Location(_) => QueryMode::Location,
            Self::Zone(_) => QueryMode::Zone,
        }
    }

    /// Returns the location name or zone label.
    pub fn value(&self) -> &str {
        match self {
            Self::Location(name) => name,
            Self::Zone(zone) => zone.as_str(),
        }
    }
}

impl fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mode(), self.value())
    }
}

/// Options a user may change after the configuration was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Whether TLS certificates of the API are verified.
    pub verify_ssl: bool,
    /// Hours between two scheduled refreshes.
    pub poll_interval_hours: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            verify_ssl: true,
            poll_interval_hours: DEFAULT_POLL_INTERVAL_HOURS,
        }
    }
}

impl QueryOptions {
    /// Checks the option values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_hours == 0 {
            return Err(ConfigError::InvalidInterval {
                hours: self.poll_interval_hours,
            });
        }
        Ok(())
    }

    /// Returns the poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_interval_hours) * 3600)
    }
}

/// A validated query against the holiday dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    target: QueryTarget,
    options: QueryOptions,
}

impl Query {
    /// Creates a location query with default options.
    pub fn location(name: impl AsRef<str>) -> Result<Self, ConfigError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyLocation);
        }
        Ok(Self {
            target: QueryTarget::Location(name.to_string()),
            options: QueryOptions::default(),
        })
    }

    /// Creates a zone query with default options.
    pub fn zone(zone: Zone) -> Self {
        Self {
            target: QueryTarget::Zone(zone),
            options: QueryOptions::default(),
        }
    }

    /// Builder: replace the options.
    pub fn with_options(mut self, options: QueryOptions) -> Result<Self, ConfigError> {
        self.set_options(options)?;
        Ok(self)
    }

    /// Builder: toggle TLS verification.
    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.options.verify_ssl = verify_ssl;
        self
    }

    /// Replaces the options after validating them.
    pub fn set_options(&mut self, options: QueryOptions) -> Result<(), ConfigError> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Returns the query target.
    pub fn target(&self) -> &QueryTarget {
        &self.target
    }

    /// Returns the current options.
    pub fn options(&self) -> QueryOptions {
        self.options
    }

    /// Returns the query mode.
    pub fn mode(&self) -> QueryMode {
        self.target.mode()
    }

    /// Returns the location name or zone label.
    pub fn value(&self) -> &str {
        self.target.value()
    }

    /// Returns whether TLS certificates are verified.
    pub fn verify_ssl(&self) -> bool {
        self.options.verify_ssl
    }

    /// Returns the time between two scheduled refreshes.
    pub fn poll_interval(&self) -> Duration {
        self.options.poll_interval()
    }
}

/// One configured holiday calendar, as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Stable identifier of the entry. Generated by the loader when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Whether `value` is a location or a zone.
    pub mode: QueryMode,

    /// Location name or zone label.
    pub value: String,

    /// Hours between two scheduled refreshes.
    #[serde(default = "default_poll_interval_hours")]
    pub poll_interval_hours: u32,

    /// Whether TLS certificates of the API are verified.
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// Whether a calendar view is exposed next to the sensor.
    #[serde(default)]
    pub create_calendar: bool,
}

fn default_poll_interval_hours() -> u32 {
    DEFAULT_POLL_INTERVAL_HOURS
}

fn default_verify_ssl() -> bool {
    true
}

impl EntryConfig {
    /// Creates a location entry with default options.
    pub fn location(name: impl Into<String>) -> Self {
        Self::new(QueryMode::Location, name)
    }

    /// Creates a zone entry with default options.
    pub fn zone(zone: Zone) -> Self {
        Self::new(QueryMode::Zone, zone.as_str())
    }

    fn new(mode: QueryMode, value: impl Into<String>) -> Self {
        Self {
            id: None,
            mode,
            value: value.into(),
            poll_interval_hours: DEFAULT_POLL_INTERVAL_HOURS,
            verify_ssl: true,
            create_calendar: false,
        }
    }

    /// Returns the options part of this entry.
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            verify_ssl: self.verify_ssl,
            poll_interval_hours: self.poll_interval_hours,
        }
    }

    /// Returns the validated target, ignoring the options.
    ///
    /// Entries spelling the same zone or location differently ("zone c",
    /// "Zone C") have equal targets.
    pub fn target(&self) -> Result<QueryTarget, ConfigError> {
        match self.mode {
            QueryMode::Location => Ok(Query::location(&self.value)?.target),
            QueryMode::Zone => Ok(QueryTarget::Zone(self.value.parse()?)),
        }
    }

    /// Validates the entry and builds the corresponding query.
    pub fn validate(&self) -> Result<Query, ConfigError> {
        let query = Query {
            target: self.target()?,
            options: QueryOptions::default(),
        };
        query.with_options(self.options())
    }
}
