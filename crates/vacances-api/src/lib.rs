//! Client for the education.gouv.fr school-holiday calendar API.
//!
//! - [`ApiClient`] - builds the dataset query and performs the HTTP call
//! - [`HolidaySource`] - the object-safe seam the refresh coordinator depends on
//! - [`RawRecord`] - the first matching dataset record, fields as strings
//! - [`normalize_record`] - turns a record into a [`VacationStatus`](vacances_core::VacationStatus)
//! - [`FetchError`] - classified fetch failures
//!
//! ```text
//!   Query + today ──► ApiClient::build_url ──► GET ──► RawRecord
//!                                                        │
//!                                  normalize_record(now) ▼
//!                                                 VacationStatus
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod record;
pub mod source;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{FetchError, FetchErrorKind, FetchResult};
pub use normalize::{normalize_record, parse_api_date};
pub use record::RawRecord;
pub use source::{BoxFuture, HolidaySource};
