//! Registry of configured entries.
//!
//! Each entry owns its own coordinator and scheduler task; entries never
//! share state. The registry is owned by the application and passed around
//! explicitly.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use vacances_api::{ApiClient, ApiConfig, FetchResult, HolidaySource};
use vacances_core::{Clock, EntryConfig, QueryOptions, SystemClock, VacationStatus};

use crate::calendar::CalendarView;
use crate::coordinator::{Coordinator, CoordinatorConfig};
use crate::error::{ServerError, ServerResult};
use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerHandle};
use crate::sensor::SensorView;

struct RegisteredEntry {
    config: EntryConfig,
    coordinator: Coordinator,
    scheduler: SchedulerHandle,
    task: JoinHandle<()>,
}

/// Set-up entries, keyed by entry id.
pub struct Registry {
    clock: Arc<dyn Clock>,
    coordinator_config: CoordinatorConfig,
    scheduler_config: SchedulerConfig,
    entries: BTreeMap<String, RegisteredEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Registry {
    /// Creates an empty registry using the given clock for every coordinator.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            coordinator_config: CoordinatorConfig::default(),
            scheduler_config: SchedulerConfig::default(),
            entries: BTreeMap::new(),
        }
    }

    /// Builder: set the coordinator configuration of future entries.
    pub fn with_coordinator_config(mut self, config: CoordinatorConfig) -> Self {
        self.coordinator_config = config;
        self
    }

    /// Builder: set the scheduler configuration of future entries.
    pub fn with_scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.scheduler_config = config;
        self
    }

    /// Sets up an entry: validates it, runs the first refresh and starts its
    /// scheduler.
    ///
    /// # Errors
    ///
    /// - [`ServerError::DuplicateEntry`] if the id is already set up
    /// - [`ServerError::Config`] if the entry is invalid
    /// - [`ServerError::NotReady`] if the first refresh fails; nothing is kept
    pub async fn setup_entry(
        &mut self,
        id: impl Into<String>,
        config: EntryConfig,
        source: Arc<dyn HolidaySource>,
    ) -> ServerResult<Coordinator> {
        let coordinator_config = self.coordinator_config.clone();
        self.setup_entry_with(id.into(), config, source, coordinator_config)
            .await
    }

    /// Sets up an entry backed by its own HTTP client.
    ///
    /// The coordinator's fetch timeout follows `api.timeout`.
    pub async fn setup_api_entry(
        &mut self,
        id: impl Into<String>,
        config: EntryConfig,
        api: &ApiConfig,
    ) -> ServerResult<Coordinator> {
        let client = ApiClient::new(api.clone()).map_err(ServerError::Client)?;
        let coordinator_config = self
            .coordinator_config
            .clone()
            .with_fetch_timeout(api.timeout);
        self.setup_entry_with(id.into(), config, Arc::new(client), coordinator_config)
            .await
    }

    async fn setup_entry_with(
        &mut self,
        id: String,
        config: EntryConfig,
        source: Arc<dyn HolidaySource>,
        coordinator_config: CoordinatorConfig,
    ) -> ServerResult<Coordinator> {
        if self.entries.contains_key(&id) {
            return Err(ServerError::duplicate_entry(id));
        }

        let query = config.validate()?;
        let coordinator = Coordinator::new(
            id.clone(),
            query,
            source,
            self.clock.clone(),
            coordinator_config,
        );
        coordinator.first_refresh().await?;

        let scheduler = Scheduler::new(self.scheduler_config.clone());
        let handle = scheduler.handle();
        let task = tokio::spawn(scheduler.run(coordinator.clone()));

        info!(entry = %id, target = %coordinator.query().target(), "Entry set up");
        self.entries.insert(
            id,
            RegisteredEntry {
                config,
                coordinator: coordinator.clone(),
                scheduler: handle,
                task,
            },
        );
        Ok(coordinator)
    }

    /// Stops an entry's scheduler and forgets the entry.
    pub async fn unload_entry(&mut self, id: &str) -> ServerResult<()> {
        let entry = self
            .entries
            .remove(id)
            .ok_or_else(|| ServerError::unknown_entry(id))?;
        stop(id, entry).await;
        info!(entry = %id, "Entry unloaded");
        Ok(())
    }

    /// Applies new options to an entry, restarts its wait and refreshes it.
    ///
    /// The refresh outcome is recorded in the coordinator's state; only
    /// invalid options or an unknown id fail the call.
    pub async fn update_options(&mut self, id: &str, options: QueryOptions) -> ServerResult<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| ServerError::unknown_entry(id))?;

        entry.coordinator.update_options(options)?;
        entry.config.verify_ssl = options.verify_ssl;
        entry.config.poll_interval_hours = options.poll_interval_hours;

        if entry.scheduler.reschedule().await.is_err() {
            warn!(entry = %id, "Scheduler is gone, cannot reschedule");
        }
        let _ = entry.coordinator.refresh_now().await;
        Ok(())
    }

    /// Toggles the calendar view of an entry.
    pub fn set_create_calendar(&mut self, id: &str, create_calendar: bool) -> ServerResult<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| ServerError::unknown_entry(id))?;
        entry.config.create_calendar = create_calendar;
        Ok(())
    }

    /// Returns the coordinator of an entry.
    pub fn get(&self, id: &str) -> Option<&Coordinator> {
        self.entries.get(id).map(|entry| &entry.coordinator)
    }

    /// Returns the configuration an entry was set up with, options included.
    pub fn entry_config(&self, id: &str) -> Option<&EntryConfig> {
        self.entries.get(id).map(|entry| &entry.config)
    }

    /// Returns the ids of all entries, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the sensor view of an entry.
    pub fn sensor(&self, id: &str) -> Option<SensorView> {
        self.get(id).map(SensorView::from_coordinator)
    }

    /// Returns the calendar view of an entry, if it was configured with one.
    pub fn calendar(&self, id: &str) -> Option<CalendarView> {
        let entry = self.entries.get(id)?;
        entry
            .config
            .create_calendar
            .then(|| CalendarView::from_coordinator(id, &entry.coordinator))
    }

    /// Refreshes every entry concurrently.
    pub async fn refresh_all(&self) -> Vec<(String, FetchResult<VacationStatus>)> {
        let refreshes = self.entries.iter().map(|(id, entry)| async move {
            (id.clone(), entry.coordinator.refresh_now().await)
        });
        join_all(refreshes).await
    }

    /// Stops every scheduler and empties the registry.
    pub async fn shutdown(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        for (id, entry) in entries {
            stop(&id, entry).await;
        }
        info!("Registry shut down");
    }
}

async fn stop(id: &str, entry: RegisteredEntry) {
    if entry.scheduler.stop().await.is_err() {
        warn!(entry = %id, "Scheduler already stopped");
    }
    if let Err(e) = entry.task.await {
        warn!(entry = %id, error = %e, "Scheduler task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::tests::{FakeSource, date};
    use vacances_api::FetchError;
    use vacances_core::{ConfigError, FixedClock, Zone};

    fn registry() -> Registry {
        Registry::new(Arc::new(FixedClock::at_date(date(2024, 12, 25))))
    }

    #[tokio::test]
    async fn setup_exposes_views() {
        let mut registry = registry();
        let mut config = EntryConfig::location("Paris");
        config.create_calendar = true;

        let coordinator = registry
            .setup_entry("paris", config, Arc::new(FakeSource::noel()))
            .await
            .unwrap();
        assert!(coordinator.current_snapshot().unwrap().on_vacation);

        let sensor = registry.sensor("paris").unwrap();
        assert!(sensor.available);
        assert_eq!(sensor.state.as_deref(), Some("Zone C - Holidays"));

        let calendar = registry.calendar("paris").unwrap();
        assert_eq!(calendar.event().unwrap().summary, "Noël");
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["paris"]);

        registry.shutdown().await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn calendar_only_when_configured() {
        let mut registry = registry();
        registry
            .setup_entry("zone-c", EntryConfig::zone(Zone::C), Arc::new(FakeSource::noel()))
            .await
            .unwrap();

        assert!(registry.sensor("zone-c").is_some());
        assert!(registry.calendar("zone-c").is_none());

        registry.set_create_calendar("zone-c", true).unwrap();
        assert!(registry.calendar("zone-c").is_some());
        registry.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_fetching() {
        let mut registry = registry();
        let source = Arc::new(FakeSource::noel());
        let mut config = EntryConfig::zone(Zone::A);
        config.value = "Zone Z".into();

        let err = registry
            .setup_entry("bad", config, source.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Config(ConfigError::UnknownZone { .. })));
        assert_eq!(source.calls(), 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn failed_first_refresh_is_not_ready() {
        let mut registry = registry();
        let err = registry
            .setup_entry(
                "paris",
                EntryConfig::location("Paris"),
                Arc::new(FakeSource::always(Err(FetchError::NoData))),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServerError::NotReady { ref entry, source: FetchError::NoData } if entry == "paris"
        ));
        assert!(registry.get("paris").is_none());
    }

    #[tokio::test]
    async fn duplicate_and_unknown_ids() {
        let mut registry = registry();
        registry
            .setup_entry("paris", EntryConfig::location("Paris"), Arc::new(FakeSource::noel()))
            .await
            .unwrap();

        let err = registry
            .setup_entry("paris", EntryConfig::location("Paris"), Arc::new(FakeSource::noel()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::DuplicateEntry { .. }));

        registry.unload_entry("paris").await.unwrap();
        assert!(matches!(
            registry.unload_entry("paris").await,
            Err(ServerError::UnknownEntry { .. })
        ));
    }

    #[tokio::test]
    async fn update_options_refreshes_immediately() {
        let mut registry = registry();
        let source = Arc::new(FakeSource::noel());
        registry
            .setup_entry("paris", EntryConfig::location("Paris"), source.clone())
            .await
            .unwrap();

        let options = QueryOptions {
            verify_ssl: false,
            poll_interval_hours: 24,
        };
        registry.update_options("paris", options).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(registry.get("paris").unwrap().query().options(), options);
        let config = registry.entry_config("paris").unwrap();
        assert!(!config.verify_ssl);
        assert_eq!(config.poll_interval_hours, 24);

        let invalid = QueryOptions {
            poll_interval_hours: 0,
            ..options
        };
        assert!(matches!(
            registry.update_options("paris", invalid).await,
            Err(ServerError::Config(ConfigError::InvalidInterval { hours: 0 }))
        ));
        registry.shutdown().await;
    }

    #[tokio::test]
    async fn entries_are_isolated() {
        let mut registry = registry();
        let paris = Arc::new(FakeSource::noel());
        let zone_a = Arc::new(FakeSource::noel());
        registry
            .setup_entry("paris", EntryConfig::location("Paris"), paris.clone())
            .await
            .unwrap();
        registry
            .setup_entry("zone-a", EntryConfig::zone(Zone::A), zone_a.clone())
            .await
            .unwrap();

        let outcomes = registry.refresh_all().await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].0, "paris");
        assert_eq!(outcomes[1].0, "zone-a");
        assert!(outcomes.iter().all(|(_, outcome)| outcome.is_ok()));
        assert_eq!(paris.calls(), 2);
        assert_eq!(zone_a.calls(), 2);

        registry.unload_entry("paris").await.unwrap();
        assert!(registry.get("zone-a").is_some());
        assert_eq!(registry.len(), 1);
        registry.shutdown().await;
    }
}
