//! Formatting helpers shared by the exporters and the CLI.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// Human readable database size.
///
/// Anything under a megabyte is shown in KB, so a 512 byte file reads
/// `0.5 KB`.
#[must_use]
pub fn format_database_size(bytes: usize) -> String {
    let bytes = bytes as f64;
    if bytes < MB {
        format!("{:.1} KB", bytes / KB)
    } else if bytes < GB {
        format!("{:.1} MB", bytes / MB)
    } else {
        format!("{:.1} GB", bytes / GB)
    }
}

/// Render a device timestamp as `YYYY-MM-DD`.
///
/// The device writes RFC 3339 timestamps, with or without offset and
/// fractional seconds. Anything unparseable is returned unchanged.
#[must_use]
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let date = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"));

    date.map_or_else(|_| raw.to_string(), |date| date.format("%Y-%m-%d").to_string())
}
