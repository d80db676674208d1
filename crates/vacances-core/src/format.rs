//! French date formatting.
//!
//! Month names come from a static table so output never depends on the
//! process locale.

use chrono::{Datelike, NaiveDate};

const MONTHS_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Returns the French name of a month (1 = janvier), or `None` outside 1..=12.
pub fn french_month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTHS_FR.get(index).copied()
}

/// Formats a date as `21 décembre 2024`. The first of a month is `1er`.
pub fn long_date(date: NaiveDate) -> String {
    let day = match date.day() {
        1 => "1er".to_string(),
        d => d.to_string(),
    };
    let month = french_month_name(date.month()).unwrap_or_default();
    format!("{} {} {}", day, month, date.year())
}

/// Formats a date as `21/12/2024`.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
