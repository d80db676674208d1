//! Refresh coordinator, scheduler, entry registry and views.
//!
//! This crate keeps school-holiday data fresh for a set of configured entries:
//! - [`Coordinator`] - single-flight fetch-and-normalize pipeline per query
//! - [`Scheduler`] - periodic ticks with backoff after failures
//! - [`Registry`] - entry id to coordinator/scheduler, owned by the application
//! - [`SensorView`] and [`CalendarView`] - read-only views of a coordinator
//! - [`SignalHandler`] - shutdown and reload notifications for the daemon
//!
//! # Example
//!
//! ```rust,no_run
//! use vacances_api::ApiConfig;
//! use vacances_core::EntryConfig;
//! use vacances_server::Registry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = Registry::default();
//!     registry
//!         .setup_api_entry("paris", EntryConfig::location("Paris"), &ApiConfig::default())
//!         .await?;
//!
//!     if let Some(sensor) = registry.sensor("paris") {
//!         println!("{:?}", sensor.state);
//!     }
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```

mod calendar;
mod coordinator;
mod error;
mod registry;
mod scheduler;
mod sensor;
mod signals;

pub use calendar::{CalendarEvent, CalendarView};
pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorState, DEFAULT_FETCH_TIMEOUT};
pub use error::{ServerError, ServerResult};
pub use registry::Registry;
pub use scheduler::{
    Scheduler, SchedulerCommand, SchedulerConfig, SchedulerHandle, SchedulerState,
    SharedSchedulerState, new_scheduler_state,
};
pub use sensor::{ATTRIBUTION, SensorAttributes, SensorView};
pub use signals::{ReloadSignal, ShutdownSignal, SignalHandler};
