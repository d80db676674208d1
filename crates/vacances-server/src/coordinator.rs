//! Refresh coordinator.
//!
//! A [`Coordinator`] owns the state of one query: the last good
//! [`VacationStatus`], the outcome of the last attempt and the in-flight
//! fetch, if any. At most one fetch runs at a time; callers arriving while
//! one is running join it and receive the same outcome.
//!
//! ```text
//!   refresh_now ─┐
//!   refresh_now ─┼──► Shared(fetch) ──► HolidaySource::fetch ──► normalize
//!   tick ────────┘                                                   │
//!                       watch::Sender<CoordinatorState> ◄── publish ─┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::Shared;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use vacances_api::{BoxFuture, FetchError, FetchErrorKind, FetchResult, HolidaySource, normalize_record};
use vacances_core::{Clock, ConfigError, Query, QueryOptions, VacationStatus};

use crate::error::{ServerError, ServerResult};

/// Default bound on a whole fetch, request and body included.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

type SharedFetch = Shared<BoxFuture<'static, FetchResult<VacationStatus>>>;

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Upper bound on one fetch; expiry resolves every joined caller with
    /// [`FetchError::Timeout`].
    pub fetch_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl CoordinatorConfig {
    /// Builder: set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// What a coordinator knows after its last attempts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinatorState {
    /// Result of the last successful refresh. Kept when later refreshes fail.
    pub last_snapshot: Option<VacationStatus>,
    /// Whether the last completed attempt succeeded.
    pub last_success: bool,
    /// Category of the last failure, cleared on success.
    pub last_error: Option<FetchErrorKind>,
    /// Message of the last failure, cleared on success.
    pub last_error_message: Option<String>,
    /// When the last attempt started.
    pub last_attempt: Option<DateTime<Utc>>,
    /// When the last successful attempt started.
    pub last_success_at: Option<DateTime<Utc>>,
    /// Failures since the last success.
    pub consecutive_failures: u32,
}

impl CoordinatorState {
    /// Records a successful refresh.
    pub fn record_success(&mut self, snapshot: VacationStatus, at: DateTime<Utc>) {
        self.last_snapshot = Some(snapshot);
        self.last_success = true;
        self.last_error = None;
        self.last_error_message = None;
        self.last_attempt = Some(at);
        self.last_success_at = Some(at);
        self.consecutive_failures = 0;
    }

    /// Records a failed refresh. The snapshot is left untouched.
    pub fn record_failure(&mut self, error: &FetchError, at: DateTime<Utc>) {
        self.last_success = false;
        self.last_error = Some(error.kind());
        self.last_error_message = Some(error.to_string());
        self.last_attempt = Some(at);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// Returns true if a snapshot exists but the last attempt failed.
    pub fn is_stale(&self) -> bool {
        self.last_snapshot.is_some() && !self.last_success
    }
}

/// Periodic fetch-and-normalize pipeline for one query.
///
/// Cloning is cheap; clones share the same state and in-flight fetch.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

struct Inner {
    label: String,
    query: Mutex<Query>,
    source: Arc<dyn HolidaySource>,
    clock: Arc<dyn Clock>,
    config: CoordinatorConfig,
    state_tx: watch::Sender<CoordinatorState>,
    in_flight: Mutex<Option<SharedFetch>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("label", &self.inner.label)
            .field("query", &*lock(&self.inner.query))
            .field("source", &self.inner.source.name())
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}

impl Coordinator {
    /// Creates a coordinator with no snapshot yet.
    pub fn new(
        label: impl Into<String>,
        query: Query,
        source: Arc<dyn HolidaySource>,
        clock: Arc<dyn Clock>,
        config: CoordinatorConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(CoordinatorState::default());
        Self {
            inner: Arc::new(Inner {
                label: label.into(),
                query: Mutex::new(query),
                source,
                clock,
                config,
                state_tx,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Returns the label used in logs and errors.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Returns a copy of the current query.
    pub fn query(&self) -> Query {
        lock(&self.inner.query).clone()
    }

    /// Returns the time between two scheduled refreshes.
    pub fn poll_interval(&self) -> Duration {
        lock(&self.inner.query).poll_interval()
    }

    /// Replaces the query options.
    ///
    /// Takes effect on the next fetch; a fetch already in flight keeps the
    /// options it started with.
    pub fn update_options(&self, options: QueryOptions) -> Result<(), ConfigError> {
        lock(&self.inner.query).set_options(options)?;
        info!(
            entry = %self.inner.label,
            verify_ssl = options.verify_ssl,
            poll_interval_hours = options.poll_interval_hours,
            "Updated options"
        );
        Ok(())
    }

    /// Triggers a fetch, or joins the one in flight, and waits for its outcome.
    pub async fn refresh_now(&self) -> FetchResult<VacationStatus> {
        let fetch = {
            let mut slot = lock(&self.inner.in_flight);
            if let Some(fetch) = slot.clone() {
                debug!(entry = %self.inner.label, "Joining in-flight refresh");
                fetch
            } else {
                let inner = self.inner.clone();
                let fut: BoxFuture<'static, _> = Box::pin(inner.run_fetch());
                let fetch = fut.shared();
                *slot = Some(fetch.clone());
                // Driven on its own so it completes even if every caller goes away.
                tokio::spawn(fetch.clone());
                fetch
            }
        };
        fetch.await
    }

    /// Runs a refresh for the scheduler, discarding the outcome.
    pub async fn scheduled_tick(&self) {
        let _ = self.refresh_now().await;
    }

    /// Runs the first refresh of an entry.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotReady`] when the fetch fails.
    pub async fn first_refresh(&self) -> ServerResult<VacationStatus> {
        self.refresh_now()
            .await
            .map_err(|e| ServerError::not_ready(self.inner.label.clone(), e))
    }

    /// Returns the last good snapshot.
    pub fn current_snapshot(&self) -> Option<VacationStatus> {
        self.inner.state_tx.borrow().last_snapshot.clone()
    }

    /// Returns a copy of the full state.
    pub fn state(&self) -> CoordinatorState {
        self.inner.state_tx.borrow().clone()
    }

    /// Returns a receiver notified after every completed attempt.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state_tx.subscribe()
    }

    /// Returns true while a fetch is in flight.
    pub fn is_refreshing(&self) -> bool {
        lock(&self.inner.in_flight).is_some()
    }
}

impl Inner {
    async fn run_fetch(self: Arc<Self>) -> FetchResult<VacationStatus> {
        let query = lock(&self.query).clone();
        let now = self.clock.now();
        let today = now.date_naive();

        debug!(
            entry = %self.label,
            source = self.source.name(),
            target = %query.target(),
            %today,
            "Starting refresh"
        );

        let outcome =
            match tokio::time::timeout(self.config.fetch_timeout, self.source.fetch(&query, today))
                .await
            {
                Ok(Ok(raw)) => normalize_record(&raw, now),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(FetchError::Timeout),
            };

        lock(&self.in_flight).take();

        match &outcome {
            Ok(status) => {
                info!(
                    entry = %self.label,
                    on_vacation = status.on_vacation,
                    description = %status.description,
                    start = %status.period_start,
                    end = %status.period_end,
                    "Refresh succeeded"
                );
                self.state_tx
                    .send_modify(|state| state.record_success(status.clone(), now));
            }
            Err(e) => {
                warn!(entry = %self.label, kind = %e.kind(), error = %e, "Refresh failed");
                self.state_tx.send_modify(|state| state.record_failure(e, now));
            }
        }

        outcome
    }
}
