//! Record normalization.
//!
//! Converts a [`RawRecord`] into a [`VacationStatus`] against a single clock
//! sample. The UTC date of `now` is the only "today" used, so a status never
//! mixes two different days.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::trace;

use vacances_core::{VacationStatus, is_on_vacation};

use crate::error::{FetchError, FetchResult};
use crate::record::RawRecord;

/// Parses an API date.
///
/// Accepts `YYYY-MM-DD` and full ISO-8601 datetimes, of which only the date
/// part is kept.
pub fn parse_api_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Normalizes a record into a vacation status.
///
/// # Errors
///
/// Returns [`FetchError::Schema`] naming the offending field when a date does
/// not parse or the period ends before it starts.
pub fn normalize_record(raw: &RawRecord, now: DateTime<Utc>) -> FetchResult<VacationStatus> {
    let period_start =
        parse_api_date(&raw.start_date).ok_or_else(|| FetchError::schema("start_date"))?;
    let period_end =
        parse_api_date(&raw.end_date).ok_or_else(|| FetchError::schema("end_date"))?;

    if period_start > period_end {
        return Err(FetchError::schema("end_date"));
    }

    let today = now.date_naive();
    let on_vacation = is_on_vacation(period_start, period_end, today);
    trace!(%period_start, %period_end, %today, on_vacation, "Normalized record");

    Ok(VacationStatus {
        on_vacation,
        period_start,
        period_end,
        description: raw.description.trim().to_string(),
        location: raw.location.clone(),
        zone: raw.zones.clone(),
        school_year: raw.annee_scolaire.clone(),
        fetched_at: now,
    })
}
