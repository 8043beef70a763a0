//! Fetch window resolution
//!
//! Turns the configured [`WindowConfig`] into a [`FetchFilter`] with concrete
//! timestamps. Date bounds may be absolute (`2024-03-01`, `2024-03-01T08:00:00`)
//! or relative to the run's clock (`now`, `today`, `yesterday`,
//! `3 days ago`). Sub-second precision is always dropped.

use crate::adapters::woocommerce::FetchFilter;
use crate::config::WindowConfig;
use crate::domain::{Result, StrataError};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::OnceLock;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Resolve the configured window against `now`
///
/// # Errors
///
/// Returns [`StrataError::Configuration`] if a bound cannot be parsed or the
/// lower date bound lies after the upper one.
pub fn resolve_window(window: &WindowConfig, now: NaiveDateTime) -> Result<FetchFilter> {
    match window {
        WindowConfig::All => Ok(FetchFilter::All),
        WindowConfig::DateRange { date_from, date_to } => {
            let after = parse_date_bound(date_from, now)?;
            let before = parse_date_bound(date_to, now)?;
            if after > before {
                return Err(StrataError::Configuration(format!(
                    "date_from '{date_from}' ({after}) is after date_to '{date_to}' ({before})"
                )));
            }
            Ok(FetchFilter::DateRange { after, before })
        }
        WindowConfig::FieldLowerBound { field, value } => Ok(FetchFilter::FieldLowerBound {
            field: field.clone(),
            value: value.clone(),
        }),
    }
}

/// Parse one absolute or relative date bound
///
/// # Errors
///
/// Returns [`StrataError::Configuration`] for an unrecognized expression.
pub fn parse_date_bound(input: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let text = input.trim().to_lowercase();
    let midnight = |date: NaiveDate| date.and_hms_opt(0, 0, 0);

    let parsed = match text.as_str() {
        "now" => Some(now),
        "today" => midnight(now.date()),
        "yesterday" => now.date().pred_opt().and_then(midnight),
        _ => parse_relative(&text, now)?.or_else(|| parse_absolute(&text)),
    };

    parsed
        .and_then(|dt| dt.with_nanosecond(0))
        .ok_or_else(|| StrataError::Configuration(format!("Unrecognized date '{input}'")))
}

fn relative_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d+)\s*(minute|hour|day|week)s?\s+ago$"))
        .as_ref()
        .map_err(|e| StrataError::Other(format!("Invalid date pattern: {e}")))
}

fn parse_relative(text: &str, now: NaiveDateTime) -> Result<Option<NaiveDateTime>> {
    let Some(caps) = relative_pattern()?.captures(text) else {
        return Ok(None);
    };

    let amount: i64 = caps[1]
        .parse()
        .map_err(|_| StrataError::Configuration(format!("Date offset too large in '{text}'")))?;
    let offset = match &caps[2] {
        "minute" => Duration::try_minutes(amount),
        "hour" => Duration::try_hours(amount),
        "day" => Duration::try_days(amount),
        _ => Duration::try_weeks(amount),
    };

    Ok(offset.and_then(|offset| now.checked_sub_signed(offset)))
}

fn parse_absolute(text: &str) -> Option<NaiveDateTime> {
    let upper = text.to_uppercase();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&upper, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&upper, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
