//! Sensor view of a coordinator.

use chrono::NaiveDate;
use serde::Serialize;

use vacances_core::Query;

use crate::coordinator::{Coordinator, CoordinatorState};

/// Attribution shown next to every sensor.
pub const ATTRIBUTION: &str = "Data provided by education.gouv.fr";

/// Extra attributes of the sensor, named as the host exposes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorAttributes {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    pub location: String,
    pub zone: String,
    #[serde(rename = "année_scolaire")]
    pub annee_scolaire: String,
    #[serde(rename = "en_vacances")]
    pub en_vacances: bool,
}

/// Read-only sensor built from a coordinator's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorView {
    pub unique_id: String,
    pub name: String,
    /// `"<zone> - Holidays"` or `"<zone> - Work"`, absent without a snapshot.
    pub state: Option<String>,
    /// False only when no refresh ever succeeded.
    pub available: bool,
    /// True when the shown data is older than the last failed attempt.
    pub stale: bool,
    pub attribution: &'static str,
    /// Empty without a snapshot.
    pub attributes: Option<SensorAttributes>,
}

impl SensorView {
    /// Builds the view for a query from a state copy.
    pub fn new(query: &Query, state: &CoordinatorState) -> Self {
        let snapshot = state.last_snapshot.as_ref();
        Self {
            unique_id: format!("vacances_scolaires_{}_{}", query.mode(), query.value()),
            name: format!("Vacances Scolaires {}", query.value()),
            state: snapshot.map(|s| s.display_state()),
            available: snapshot.is_some(),
            stale: state.is_stale(),
            attribution: ATTRIBUTION,
            attributes: snapshot.map(|s| SensorAttributes {
                start_date: s.period_start,
                end_date: s.period_end,
                description: s.description.clone(),
                location: s.location.clone(),
                zone: s.zone.clone(),
                annee_scolaire: s.school_year.clone(),
                en_vacances: s.on_vacation,
            }),
        }
    }

    /// Builds the view from the coordinator's current state.
    pub fn from_coordinator(coordinator: &Coordinator) -> Self {
        Self::new(&coordinator.query(), &coordinator.state())
    }
}
