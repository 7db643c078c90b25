//! Multi-format date parsing for heterogeneous source columns.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());

/// Numbers above this are treated as absolute spreadsheet serial dates;
/// smaller values in the same column family are day-count durations.
const SERIAL_DATE_THRESHOLD: f64 = 30_000.0;

/// Days from the spreadsheet epoch (1899-12-30) to the Unix epoch.
const UNIX_EPOCH_SERIAL: f64 = 25_569.0;

/// Last-resort formats for free-form date strings.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d",
    "%d-%m-%Y",
];

/// Parses a value of unknown shape into a calendar date.
///
/// Attempts, in order: ISO `YYYY-M-D`, `D/M/YYYY`, spreadsheet serial number,
/// then a short list of free-form formats. Returns `None` on failure, never
/// an error.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Null => None,
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => parse_serial(n.as_f64()?),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_RE.captures(s) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = SLASH_RE.captures(s) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }

    if let Ok(n) = s.parse::<f64>() {
        return parse_serial(n);
    }

    for fmt in FALLBACK_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        year.parse().ok()?,
        month.parse().ok()?,
        day.parse().ok()?,
    )
}

fn parse_serial(n: f64) -> Option<NaiveDate> {
    if !n.is_finite() || n <= SERIAL_DATE_THRESHOLD {
        return None;
    }
    let days = (n - UNIX_EPOCH_SERIAL).floor() as i64;
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days))
}
