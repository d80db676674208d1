//! Run command: keeps every configured entry refreshed in the foreground.
//!
//! - Signal handler (SIGTERM/SIGINT for shutdown, SIGHUP for reload)
//! - One coordinator and scheduler per entry, owned by a [`Registry`]
//! - Entries whose first refresh failed are retried periodically
//!
//! On reload the configuration file is read again and the differences are
//! applied: new entries are set up, removed ones unloaded, option changes
//! applied with an immediate refresh.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info, warn};

use vacances_api::ApiConfig;
use vacances_core::{EntryConfig, QueryOptions};
use vacances_server::{Registry, ServerError, SignalHandler};

use crate::config::{ApiSettings, CliConfig};
use crate::error::CliResult;

/// Interval between two setup attempts of entries that are not ready.
const SETUP_RETRY_INTERVAL: Duration = Duration::from_secs(300);

/// One change needed to go from the running entries to the configured ones.
#[derive(Debug, Clone, PartialEq)]
enum Change {
    Setup(String, EntryConfig),
    Unload(String),
    /// Unload then set up again; the query target changed.
    Replace(String, EntryConfig),
    Options(String, QueryOptions),
    Calendar(String, bool),
}

/// Computes the changes turning `running` into `desired`.
///
/// Unloads come first so a replaced entry never coexists with its successor.
fn plan(running: &[(String, EntryConfig)], desired: &[(String, EntryConfig)]) -> Vec<Change> {
    let mut changes = Vec::new();

    for (id, _) in running {
        if !desired.iter().any(|(wanted, _)| wanted == id) {
            changes.push(Change::Unload(id.clone()));
        }
    }

    for (id, wanted) in desired {
        let Some((_, current)) = running.iter().find(|(running_id, _)| running_id == id) else {
            changes.push(Change::Setup(id.clone(), wanted.clone()));
            continue;
        };

        if !same_target(current, wanted) {
            changes.push(Change::Replace(id.clone(), wanted.clone()));
            continue;
        }
        if current.options() != wanted.options() {
            changes.push(Change::Options(id.clone(), wanted.options()));
        }
        if current.create_calendar != wanted.create_calendar {
            changes.push(Change::Calendar(id.clone(), wanted.create_calendar));
        }
    }

    changes
}

fn same_target(current: &EntryConfig, wanted: &EntryConfig) -> bool {
    match (current.target(), wanted.target()) {
        (Ok(current), Ok(wanted)) => current == wanted,
        _ => current.mode == wanted.mode && current.value.trim() == wanted.value.trim(),
    }
}

/// The daemon's view of what is running and what should be.
struct Daemon {
    registry: Registry,
    api_settings: ApiSettings,
    api: ApiConfig,
    desired: Vec<(String, EntryConfig)>,
}

impl Daemon {
    fn new(config: &CliConfig) -> CliResult<Self> {
        Ok(Self {
            registry: Registry::default(),
            api_settings: config.api.clone(),
            api: config.api.to_api_config()?,
            desired: config.entries_with_ids(),
        })
    }

    fn running(&self) -> Vec<(String, EntryConfig)> {
        self.registry
            .ids()
            .filter_map(|id| {
                self.registry
                    .entry_config(id)
                    .map(|config| (id.to_string(), config.clone()))
            })
            .collect()
    }

    /// Brings the registry in line with the desired entries.
    async fn converge(&mut self) {
        let changes = plan(&self.running(), &self.desired);
        for change in changes {
            let result = match change {
                Change::Setup(id, entry) => self.setup(id, entry).await,
                Change::Unload(id) => self.registry.unload_entry(&id).await,
                Change::Replace(id, entry) => match self.registry.unload_entry(&id).await {
                    Ok(()) => self.setup(id, entry).await,
                    Err(e) => Err(e),
                },
                Change::Options(id, options) => self.registry.update_options(&id, options).await,
                Change::Calendar(id, enabled) => self.registry.set_create_calendar(&id, enabled),
            };

            match result {
                Ok(()) => {}
                Err(e @ ServerError::NotReady { .. }) => {
                    warn!(error = %e, retry_secs = SETUP_RETRY_INTERVAL.as_secs(), "Entry not ready, will retry");
                }
                Err(e) => error!(error = %e, "Failed to apply entry change"),
            }
        }
    }

    async fn setup(&mut self, id: String, entry: EntryConfig) -> Result<(), ServerError> {
        self.registry
            .setup_api_entry(id, entry, &self.api)
            .await
            .map(|_| ())
    }

    /// Replaces the desired state with a freshly loaded configuration.
    async fn reload(&mut self, config: CliConfig) -> CliResult<()> {
        config.validate()?;
        if config.api != self.api_settings {
            info!("API settings changed, setting up every entry again");
            self.api = config.api.to_api_config()?;
            self.api_settings = config.api.clone();
            self.registry.shutdown().await;
        }
        self.desired = config.entries_with_ids();
        self.converge().await;
        Ok(())
    }

    fn pending(&self) -> usize {
        self.desired
            .iter()
            .filter(|(id, _)| self.registry.get(id).is_none())
            .count()
    }
}

/// Runs until a shutdown signal is received.
pub async fn run(config_path: Option<PathBuf>, config: CliConfig) -> CliResult<()> {
    config.validate()?;
    if config.entries.is_empty() {
        warn!("No entries configured; waiting for a reload");
    }

    let signals = SignalHandler::new();
    signals.spawn_listener()?;
    let mut reload = signals.reload();

    let mut daemon = Daemon::new(&config)?;
    daemon.converge().await;
    info!(
        entries = daemon.registry.len(),
        pending = daemon.pending(),
        "Daemon started"
    );

    let mut retry = tokio::time::interval(SETUP_RETRY_INTERVAL);
    retry.tick().await;

    loop {
        tokio::select! {
            _ = signals.shutdown().wait() => break,
            received = reload.recv() => {
                if !received {
                    break;
                }
                let loaded = CliConfig::load_or_default(config_path.as_deref());
                match loaded {
                    Ok(config) => {
                        if let Err(e) = daemon.reload(config).await {
                            error!(error = %e, "Reload failed, keeping current entries");
                        } else {
                            info!(entries = daemon.registry.len(), pending = daemon.pending(), "Configuration reloaded");
                        }
                    }
                    Err(e) => error!(error = %e, "Reload failed, keeping current entries"),
                }
            }
            _ = retry.tick() => {
                if daemon.pending() > 0 {
                    daemon.converge().await;
                }
            }
        }
    }

    info!("Shutting down...");
    daemon.registry.shutdown().await;
    info!("Stopped");
    Ok(())
}
