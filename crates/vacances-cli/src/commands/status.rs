//! `vacances status`: one-shot fetch of the current or next holiday period.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use vacances_api::{ApiClient, HolidaySource};
use vacances_core::{
    Clock, EntryConfig, SystemClock, VacationStatus, long_date, short_date,
};
use vacances_server::{Coordinator, CoordinatorConfig, SensorView};

use crate::cli::StatusArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// One line of `status` output.
#[derive(Debug, Serialize)]
struct StatusReport {
    #[serde(flatten)]
    sensor: SensorView,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Fetches and prints the requested targets, or every configured entry.
///
/// Fails with the first fetch error after printing everything.
pub async fn status(args: &StatusArgs, config: &CliConfig) -> CliResult<()> {
    let targets = targets(args, config);
    if targets.is_empty() {
        return Err(CliError::invalid(
            "nothing to show: pass --location or --zone, or add [[entries]] to the config file",
        ));
    }

    let api = config.api.to_api_config()?;
    let coordinator_config = CoordinatorConfig::default().with_fetch_timeout(api.timeout);
    let source: Arc<dyn HolidaySource> = Arc::new(ApiClient::new(api)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut reports = Vec::new();
    let mut first_error = None;
    for (id, entry) in targets {
        let coordinator = Coordinator::new(
            id,
            entry.validate()?,
            source.clone(),
            clock.clone(),
            coordinator_config.clone(),
        );
        let outcome = coordinator.refresh_now().await;
        let error = outcome.as_ref().err().map(ToString::to_string);
        if let Err(e) = outcome {
            first_error.get_or_insert(e);
        }
        reports.push((
            StatusReport {
                sensor: SensorView::from_coordinator(&coordinator),
                error,
            },
            coordinator.current_snapshot(),
        ));
    }

    if args.json {
        let reports: Vec<_> = reports.iter().map(|(report, _)| report).collect();
        let json = serde_json::to_string_pretty(&reports)
            .map_err(|e| CliError::Output(format!("failed to serialize status: {}", e)))?;
        println!("{}", json);
    } else {
        let today = clock.today();
        for (report, snapshot) in &reports {
            print!(
                "{}",
                render_text(
                    &report.sensor.name,
                    snapshot.as_ref(),
                    report.error.as_deref(),
                    today
                )
            );
        }
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn targets(args: &StatusArgs, config: &CliConfig) -> Vec<(String, EntryConfig)> {
    let mut targets = match (&args.location, args.zone) {
        (Some(location), _) => vec![(location.clone(), EntryConfig::location(location))],
        (None, Some(zone)) => vec![(zone.to_string(), EntryConfig::zone(zone))],
        (None, None) => config.entries_with_ids(),
    };
    if args.insecure {
        for (_, entry) in &mut targets {
            entry.verify_ssl = false;
        }
    }
    targets
}

fn render_text(
    name: &str,
    snapshot: Option<&VacationStatus>,
    error: Option<&str>,
    today: NaiveDate,
) -> String {
    let Some(status) = snapshot else {
        return format!("{}: unavailable ({})\n", name, error.unwrap_or("no data"));
    };

    let when = if status.on_vacation {
        format!("until {}", short_date(status.period_end))
    } else {
        match status.days_until_start(today) {
            0 => "over".to_string(),
            1 => "starts tomorrow".to_string(),
            days => format!("starts in {} days", days),
        }
    };

    format!(
        "{}: {}\n  {} ({}), {}\n  Du {} au {} ({} days)\n",
        name,
        status.display_state(),
        status.description,
        status.school_year,
        when,
        long_date(status.period_start),
        long_date(status.period_end),
        status.duration_days(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vacances_core::{QueryMode, Zone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noel(on_vacation: bool) -> VacationStatus {
        VacationStatus {
            on_vacation,
            period_start: date(2024, 12, 21),
            period_end: date(2025, 1, 5),
            description: "Vacances de Noël".into(),
            location: "Paris".into(),
            zone: "Zone C".into(),
            school_year: "2024-2025".into(),
            fetched_at: Utc.with_ymd_and_hms(2024, 12, 25, 9, 0, 0).unwrap(),
        }
    }

    fn args() -> StatusArgs {
        StatusArgs {
            location: None,
            zone: None,
            insecure: false,
            json: false,
        }
    }

    #[test]
    fn renders_current_holidays() {
        let text = render_text(
            "Vacances Scolaires Paris",
            Some(&noel(true)),
            None,
            date(2024, 12, 25),
        );
        assert_eq!(
            text,
            "Vacances Scolaires Paris: Zone C - Holidays\n  \
             Vacances de Noël (2024-2025), until 05/01/2025\n  \
             Du 21 décembre 2024 au 5 janvier 2025 (16 days)\n"
        );
    }

    #[test]
    fn renders_upcoming_holidays() {
        let text = render_text("Paris", Some(&noel(false)), None, date(2024, 12, 10));
        assert!(text.starts_with("Paris: Zone C - Work\n"));
        assert!(text.contains("starts in 11 days"));

        let text = render_text("Paris", Some(&noel(false)), None, date(2024, 12, 20));
        assert!(text.contains("starts tomorrow"));
    }

    #[test]
    fn renders_unavailable() {
        let text = render_text("Paris", None, Some("API returned status 500"), date(2024, 12, 25));
        assert_eq!(text, "Paris: unavailable (API returned status 500)\n");
    }

    #[test]
    fn explicit_target_wins_over_config() {
        let config = CliConfig {
            entries: vec![EntryConfig::location("Lyon")],
            ..Default::default()
        };
        let mut args = args();
        args.zone = Some(Zone::B);
        args.insecure = true;

        let targets = targets(&args, &config);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].0, "Zone B");
        assert_eq!(targets[0].1.mode, QueryMode::Zone);
        assert!(!targets[0].1.verify_ssl);
    }

    #[test]
    fn configured_entries_by_default() {
        let config = CliConfig {
            entries: vec![EntryConfig::location("Lyon"), EntryConfig::zone(Zone::A)],
            ..Default::default()
        };
        let targets = targets(&args(), &config);
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|(_, entry)| entry.verify_ssl));
    }
}
