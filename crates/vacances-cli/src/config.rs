//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/vacances/config.toml` by default:
//!
//! ```toml
//! [api]
//! endpoint = "https://data.education.gouv.fr/api/explore/v2.1/catalog/datasets/fr-en-calendrier-scolaire/records"
//! timeout_secs = 10
//!
//! [[entries]]
//! id = "paris"
//! mode = "location"
//! value = "Paris"
//! poll_interval_hours = 12
//! create_calendar = true
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vacances_api::{ApiConfig, config::DEFAULT_ENDPOINT};
use vacances_core::{ConfigError, EntryConfig};

use crate::error::{CliError, CliResult};

/// Configuration for the vacances CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// API settings.
    pub api: ApiSettings,

    /// Configured holiday calendars.
    pub entries: Vec<EntryConfig>,
}

/// API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Dataset records endpoint.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: ApiConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiSettings {
    /// Converts to the API client configuration.
    pub fn to_api_config(&self) -> Result<ApiConfig, ConfigError> {
        let config = ApiConfig::new(&self.endpoint)
            .map_err(|e| ConfigError::invalid_endpoint(&self.endpoint, e.to_string()))?;
        Ok(config.with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

impl CliConfig {
    /// Loads configuration from the default path, or defaults if it does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| CliError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads configuration from `path` if given, else from the default path.
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vacances")
    }

    /// Returns every entry with its id, generating ids for entries without one.
    ///
    /// Generated ids only depend on the entry's mode and value, so they stay
    /// the same across reloads.
    pub fn entries_with_ids(&self) -> Vec<(String, EntryConfig)> {
        self.entries
            .iter()
            .map(|entry| {
                let id = entry.id.clone().unwrap_or_else(|| generated_id(entry));
                (id, entry.clone())
            })
            .collect()
    }

    /// Checks the API settings and every entry.
    pub fn validate(&self) -> CliResult<()> {
        self.api.to_api_config()?;
        if self.api.timeout_secs == 0 {
            return Err(CliError::invalid("api.timeout_secs must be at least 1"));
        }

        let mut seen = HashSet::new();
        for (id, entry) in self.entries_with_ids() {
            entry.validate()?;
            if !seen.insert(id.clone()) {
                return Err(CliError::invalid(format!("duplicate entry id: {}", id)));
            }
        }
        Ok(())
    }
}

fn generated_id(entry: &EntryConfig) -> String {
    let name = match entry.target() {
        Ok(target) => target.to_string(),
        Err(_) => format!("{}:{}", entry.mode, entry.value.trim()),
    };
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use vacances_core::{QueryMode, Zone};

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_config("");
        let config = CliConfig::load_from(file.path()).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn full_file() {
        let file = write_config(
            r#"
[api]
endpoint = "http://127.0.0.1:8080/records"
timeout_secs = 3

[[entries]]
id = "paris"
mode = "location"
value = "Paris"
create_calendar = true

[[entries]]
mode = "zone"
value = "Zone B"
poll_interval_hours = 6
verify_ssl = false
"#,
        );
        let config = CliConfig::load_from(file.path()).unwrap();

        assert_eq!(config.api.timeout_secs, 3);
        let api = config.api.to_api_config().unwrap();
        assert_eq!(api.timeout, Duration::from_secs(3));

        assert_eq!(config.entries.len(), 2);
        let paris = &config.entries[0];
        assert_eq!(paris.id.as_deref(), Some("paris"));
        assert_eq!(paris.mode, QueryMode::Location);
        assert_eq!(paris.poll_interval_hours, 12);
        assert!(paris.verify_ssl);
        assert!(paris.create_calendar);

        let zone_b = &config.entries[1];
        assert_eq!(zone_b.mode, QueryMode::Zone);
        assert_eq!(zone_b.poll_interval_hours, 6);
        assert!(!zone_b.verify_ssl);
        assert!(!zone_b.create_calendar);

        config.validate().unwrap();
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let file = write_config("[[entries]]\nmode = \"city\"\nvalue = \"Paris\"\n");
        let err = CliConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, CliError::ParseConfig { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CliError::ReadConfig { .. }));
    }

    #[test]
    fn generated_ids_are_stable() {
        let config = CliConfig {
            entries: vec![EntryConfig::zone(Zone::A), EntryConfig::location("Paris")],
            ..Default::default()
        };
        let first = config.entries_with_ids();
        let second = config.entries_with_ids();
        assert_eq!(first, second);
        assert_ne!(first[0].0, first[1].0);

        let mut with_spaces = EntryConfig::location(" Paris ");
        with_spaces.poll_interval_hours = 1;
        let other = CliConfig {
            entries: vec![with_spaces],
            ..Default::default()
        };
        assert_eq!(other.entries_with_ids()[0].0, first[1].0);

        let mut lower_zone = EntryConfig::zone(Zone::A);
        lower_zone.value = "zone a".into();
        let respelled = CliConfig {
            entries: vec![lower_zone],
            ..Default::default()
        };
        assert_eq!(respelled.entries_with_ids()[0].0, first[0].0);
    }

    #[test]
    fn validation_errors() {
        let mut config = CliConfig {
            entries: vec![EntryConfig::location("")],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CliError::Config(ConfigError::EmptyLocation))
        ));

        config.entries = vec![EntryConfig::location("Paris"), EntryConfig::location("Paris")];
        assert!(matches!(config.validate(), Err(CliError::Invalid(_))));

        config.entries.clear();
        config.api.endpoint = "not a url".into();
        assert!(matches!(
            config.validate(),
            Err(CliError::Config(ConfigError::InvalidEndpoint { .. }))
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let mut entry = EntryConfig::zone(Zone::Reunion);
        entry.id = Some("reunion".into());
        let config = CliConfig {
            entries: vec![entry],
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("value = \"Réunion\""));
        assert_eq!(toml::from_str::<CliConfig>(&text).unwrap(), config);
    }
}
