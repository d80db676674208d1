//! Core types: zones, queries, vacation status, clock, formatting

pub mod clock;
pub mod error;
pub mod format;
pub mod query;
pub mod status;
pub mod tracing;
pub mod zone;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ConfigError;
pub use format::{french_month_name, long_date, short_date};
pub use query::{
    DEFAULT_POLL_INTERVAL_HOURS, EntryConfig, Query, QueryMode, QueryOptions, QueryTarget,
};
pub use status::{VacationStatus, is_on_vacation};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use zone::Zone;
