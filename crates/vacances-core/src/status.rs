//! The vacation status snapshot.
//!
//! A [`VacationStatus`] is built once per successful refresh and never
//! mutated afterwards; a newer refresh replaces it wholesale.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Returns true when `today` falls inside the closed period `[start, end]`.
pub fn is_on_vacation(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> bool {
    start <= today && today <= end
}

/// The current or next holiday period for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationStatus {
    /// Whether `fetched_at`'s UTC date falls inside the period.
    pub on_vacation: bool,
    /// First day of the holiday period.
    pub period_start: NaiveDate,
    /// Last day of the holiday period.
    pub period_end: NaiveDate,
    /// Holiday name, e.g. "Vacances de Noël".
    pub description: String,
    /// Academy/location the period applies to.
    pub location: String,
    /// Zone label the period applies to.
    pub zone: String,
    /// School year label, e.g. "2024-2025".
    pub school_year: String,
    /// When the data was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl VacationStatus {
    /// Returns the display state shown by the sensor.
    pub fn display_state(&self) -> String {
        if self.on_vacation {
            format!("{} - Holidays", self.zone)
        } else {
            format!("{} - Work", self.zone)
        }
    }

    /// Returns true if the period ends before the given date.
    pub fn is_over(&self, today: NaiveDate) -> bool {
        self.period_end < today
    }

    /// Returns the number of days until the period starts (0 once started).
    pub fn days_until_start(&self, today: NaiveDate) -> i64 {
        (self.period_start - today).num_days().max(0)
    }

    /// Returns the length of the period in days, both ends included.
    pub fn duration_days(&self) -> i64 {
        (self.period_end - self.period_start).num_days() + 1
    }
}
