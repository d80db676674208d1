//! Background scheduler for one coordinator.
//!
//! Sleeps for the coordinator's poll interval, then runs a scheduled tick.
//! The interval is re-read every cycle so option changes apply on the next
//! one. After failures the next tick comes earlier, using exponential
//! backoff capped at the poll interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};

use crate::coordinator::Coordinator;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Delay before the first retry after a failure.
    pub initial_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(300), // 5 minutes
            backoff_multiplier: 2.0,
        }
    }
}

impl SchedulerConfig {
    /// Builder: set backoff parameters.
    pub fn with_backoff(mut self, initial: Duration, multiplier: f64) -> Self {
        self.initial_backoff = initial;
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates the delay before the next tick.
    ///
    /// Without failures this is the poll interval. Otherwise the backoff for
    /// the given failure count, never longer than the poll interval.
    pub fn next_delay(&self, consecutive_failures: u32, poll_interval: Duration) -> Duration {
        if consecutive_failures == 0 {
            return poll_interval;
        }

        let base = self.initial_backoff.as_secs_f64();
        let exponent = consecutive_failures.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay = base * self.backoff_multiplier.powi(exponent);
        let max = poll_interval.as_secs_f64();

        Duration::from_secs_f64(delay.min(max))
    }
}

/// Commands that can be sent to the scheduler.
#[derive(Debug, Clone)]
pub enum SchedulerCommand {
    /// Run a tick now.
    RefreshNow,
    /// Recompute the next delay, e.g. after the poll interval changed.
    Reschedule,
    /// Pause the scheduler.
    Pause,
    /// Resume the scheduler.
    Resume,
    /// Stop the scheduler.
    Stop,
}

/// Scheduler state.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Whether the scheduler is paused.
    pub paused: bool,
    /// Number of ticks run so far.
    pub ticks: u64,
    /// When the last tick started.
    pub last_tick: Option<DateTime<Utc>>,
}

/// Shared scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Creates a new shared scheduler state.
pub fn new_scheduler_state() -> SharedSchedulerState {
    Arc::new(RwLock::new(SchedulerState::default()))
}

/// Drives scheduled ticks of one coordinator.
pub struct Scheduler {
    config: SchedulerConfig,
    state: SharedSchedulerState,
    command_tx: mpsc::Sender<SchedulerCommand>,
    command_rx: mpsc::Receiver<SchedulerCommand>,
}

impl Scheduler {
    /// Creates a new scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        Self {
            config,
            state: new_scheduler_state(),
            command_tx,
            command_rx,
        }
    }

    /// Returns a handle for sending commands to the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    /// Runs the scheduler loop until stopped.
    ///
    /// The first tick happens after one delay; the caller is expected to
    /// have refreshed the coordinator already.
    pub async fn run(self, coordinator: Coordinator) {
        let Self {
            config,
            state,
            command_tx,
            mut command_rx,
        } = self;
        // Only handles may keep the channel open.
        drop(command_tx);

        info!(
            entry = coordinator.label(),
            interval_secs = coordinator.poll_interval().as_secs(),
            "Scheduler started"
        );

        loop {
            let failures = coordinator.state().consecutive_failures;
            let delay = config.next_delay(failures, coordinator.poll_interval());
            debug!(
                entry = coordinator.label(),
                failures,
                delay_secs = delay.as_secs(),
                "Scheduling next refresh"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if state.read().await.paused {
                        debug!(entry = coordinator.label(), "Scheduler paused, skipping refresh");
                        continue;
                    }
                    tick(&state, &coordinator).await;
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::RefreshNow) => {
                            debug!(entry = coordinator.label(), "Received RefreshNow command");
                            tick(&state, &coordinator).await;
                        }
                        Some(SchedulerCommand::Reschedule) => {
                            debug!(entry = coordinator.label(), "Received Reschedule command");
                        }
                        Some(SchedulerCommand::Pause) => {
                            info!(entry = coordinator.label(), "Scheduler paused");
                            state.write().await.paused = true;
                        }
                        Some(SchedulerCommand::Resume) => {
                            info!(entry = coordinator.label(), "Scheduler resumed");
                            state.write().await.paused = false;
                        }
                        Some(SchedulerCommand::Stop) | None => {
                            info!(entry = coordinator.label(), "Scheduler stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

async fn tick(state: &SharedSchedulerState, coordinator: &Coordinator) {
    {
        let mut state = state.write().await;
        state.ticks += 1;
        state.last_tick = Some(Utc::now());
    }
    coordinator.scheduled_tick().await;
}

/// Handle for sending commands to a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: SharedSchedulerState,
}

impl SchedulerHandle {
    /// Triggers an immediate refresh.
    pub async fn refresh_now(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::RefreshNow).await
    }

    /// Restarts the wait with the current poll interval.
    pub async fn reschedule(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Reschedule).await
    }

    /// Pauses the scheduler.
    pub async fn pause(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Pause).await
    }

    /// Resumes the scheduler.
    pub async fn resume(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Resume).await
    }

    /// Stops the scheduler.
    pub async fn stop(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Stop).await
    }

    /// Returns the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }

    /// Returns true if the scheduler is paused.
    pub async fn is_paused(&self) -> bool {
        self.state.read().await.paused
    }
}
