//! Calendar formatting and parsing for documents and storage

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::tax::report::ReportPeriod;
use crate::types::{BillingError, BillingResult};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Printed document date: `24 Oct 2023`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Generation timestamp: `24 Oct 2023, 14:05`
pub fn display_datetime(timestamp: NaiveDateTime) -> String {
    timestamp.format("%d %b %Y, %H:%M").to_string()
}

/// Storage form of a date: `2023-10-24`
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Full English month name, 1 = January
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Report heading for a month: `MARCH 2024`
pub fn period_label(period: ReportPeriod) -> String {
    let name = month_name(period.month).unwrap_or("Unknown");
    format!("{} {}", name.to_uppercase(), period.year)
}

/// Parse a stored date. Accepts `YYYY-MM-DD`, optionally followed by a
/// `T...` time part which is ignored.
pub fn parse_iso_date(value: &str) -> BillingResult<NaiveDate> {
    let trimmed = value.trim();
    let date_part = match trimmed.split_once('T') {
        Some((date, _)) => date,
        None => trimmed,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| BillingError::Validation(format!("Invalid date '{}': {}", value, e)))
}

/// The instant `now` seen from a fixed UTC offset given in minutes
pub fn local_datetime(now: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDateTime {
    match FixedOffset::east_opt(utc_offset_minutes * 60) {
        Some(offset) => now.with_timezone(&offset).naive_local(),
        None => now.naive_utc(),
    }
}

/// Calendar date of `now` at a fixed UTC offset
pub fn local_date(now: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDate {
    local_datetime(now, utc_offset_minutes).date()
}
