//! The `HolidaySource` trait.
//!
//! The refresh coordinator only knows this trait, so it can be driven by the
//! HTTP [`ApiClient`](crate::ApiClient) in production and by an in-memory
//! double in tests.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;

use vacances_core::Query;

use crate::error::FetchResult;
use crate::record::RawRecord;

/// A boxed future for async trait methods.
///
/// Boxing keeps [`HolidaySource`] object-safe so coordinators can hold an
/// `Arc<dyn HolidaySource>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can look up the holiday period for a query.
pub trait HolidaySource: Send + Sync {
    /// Returns a short name for logs (e.g. "education.gouv.fr").
    fn name(&self) -> &str;

    /// Fetches the first holiday period ending after `today`.
    ///
    /// Implementations perform exactly one attempt; retrying is the caller's
    /// concern.
    fn fetch(&self, query: &Query, today: NaiveDate) -> BoxFuture<'_, FetchResult<RawRecord>>;
}
