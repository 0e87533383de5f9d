//! Timestamp formats accepted at the edges and the one used in storage.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

/// Canonical 24-hour form, used for storage and JSON output.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 12-hour form used by spreadsheet exports: `2024-03-01 09:00:00 AM`.
pub const IMPORT_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";

/// Layouts the calendar widget may post, tried in order.
const FORM_FORMATS: &[&str] = &[
    STORAGE_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{value}' is not a valid timestamp (expected {expected})")]
pub struct TimestampError {
    pub value: String,
    pub expected: &'static str,
}

/// Parse a timestamp submitted by the calendar widget. A bare date means
/// midnight. Offset-qualified ISO timestamps (`...Z`, `...+09:00`) keep the
/// wall-clock time as written. Sub-second precision is dropped.
pub fn parse_form_timestamp(value: &str) -> Result<NaiveDateTime, TimestampError> {
    let value = value.trim();

    for fmt in FORM_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(whole_seconds(ts));
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(whole_seconds(ts.naive_local()));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimestampError {
            value: value.to_string(),
            expected: "YYYY-MM-DD HH:MM:SS",
        })
}

fn whole_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// Parse a `YYYY-MM-DD hh:mm:ss AM/PM` timestamp from an import file.
pub fn parse_import_timestamp(value: &str) -> Result<NaiveDateTime, TimestampError> {
    NaiveDateTime::parse_from_str(value.trim(), IMPORT_FORMAT).map_err(|_| TimestampError {
        value: value.to_string(),
        expected: "YYYY-MM-DD hh:mm:ss AM/PM",
    })
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Serde adapter writing timestamps in [`STORAGE_FORMAT`].
pub mod storage_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, super::STORAGE_FORMAT).map_err(de::Error::custom)
    }
}
