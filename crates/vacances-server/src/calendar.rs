//! Calendar view of a coordinator.
//!
//! The holiday period is shown as one all-day event spanning the whole
//! period, both ends included.

use chrono::NaiveDate;
use serde::Serialize;

use vacances_core::{Query, VacationStatus, long_date};

use crate::coordinator::Coordinator;

/// An all-day calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    /// First day of the event.
    pub start: NaiveDate,
    /// Last day of the event, inclusive.
    pub end: NaiveDate,
    pub description: String,
}

impl CalendarEvent {
    /// Builds the event for a holiday period.
    pub fn from_status(status: &VacationStatus) -> Self {
        Self {
            summary: status.description.clone(),
            start: status.period_start,
            end: status.period_end,
            description: format!(
                "Du {} au {}",
                long_date(status.period_start),
                long_date(status.period_end)
            ),
        }
    }

    /// Returns true if the event shares at least one day with `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && start <= self.end
    }
}

/// Read-only calendar built from a coordinator's snapshot.
#[derive(Debug, Clone)]
pub struct CalendarView {
    unique_id: String,
    name: String,
    snapshot: Option<VacationStatus>,
}

impl CalendarView {
    /// Builds the view for an entry.
    pub fn new(entry_id: &str, query: &Query, snapshot: Option<VacationStatus>) -> Self {
        Self {
            unique_id: format!("{}_calendar", entry_id),
            name: format!("Vacances Scolaires {}", query.value()),
            snapshot,
        }
    }

    /// Builds the view from the coordinator's current snapshot.
    pub fn from_coordinator(entry_id: &str, coordinator: &Coordinator) -> Self {
        Self::new(entry_id, &coordinator.query(), coordinator.current_snapshot())
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current event, only while on vacation.
    pub fn event(&self) -> Option<CalendarEvent> {
        self.snapshot
            .as_ref()
            .filter(|status| status.on_vacation)
            .map(CalendarEvent::from_status)
    }

    /// Returns the events overlapping `[start, end]`.
    ///
    /// Like [`CalendarView::event`], the period is only shown while on vacation.
    pub fn events_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<CalendarEvent> {
        self.event()
            .into_iter()
            .filter(|event| event.overlaps(start, end))
            .collect()
    }
}
