//! # Date Handling Utilities
//!
//! Rendering of API timestamps into the locale-style strings shown in
//! response tables.

use chrono::{DateTime, Timelike, Utc};

/// Placeholder rendered for missing or unparseable timestamps.
pub const INVALID_DATE: &str = "Invalid Date";

/// Formats an RFC3339 timestamp as `M/D/YYYY, h:mm:ss AM|PM` in UTC.
///
/// Missing or unparseable values render as [`INVALID_DATE`].
///
/// # Example
/// ```rust
/// use formgate_util::date_handling::format_locale_timestamp;
///
/// assert_eq!(format_locale_timestamp(Some("2024-01-05T14:03:09.512Z")), "1/5/2024, 2:03:09 PM");
/// assert_eq!(format_locale_timestamp(Some("2024-01-05T00:00:00Z")), "1/5/2024, 12:00:00 AM");
/// assert_eq!(format_locale_timestamp(Some("yesterday")), "Invalid Date");
/// assert_eq!(format_locale_timestamp(None), "Invalid Date");
/// ```
pub fn format_locale_timestamp(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(parse_rfc3339_utc)
        .map(|date_time| render_locale(&date_time))
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

fn parse_rfc3339_utc(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp.trim())
        .ok()
        .map(|date_time| date_time.with_timezone(&Utc))
}

fn render_locale(date_time: &DateTime<Utc>) -> String {
    let (is_pm, hour12) = date_time.hour12();
    format!(
        "{}, {}:{:02}:{:02} {}",
        date_time.format("%-m/%-d/%Y"),
        hour12,
        date_time.minute(),
        date_time.second(),
        if is_pm { "PM" } else { "AM" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_normalized_to_utc() {
        assert_eq!(format_locale_timestamp(Some("2023-12-25T10:30:00-05:00")), "12/25/2023, 3:30:00 PM");
    }

    #[test]
    fn noon_renders_as_twelve_pm() {
        assert_eq!(format_locale_timestamp(Some("2023-06-15T12:00:05Z")), "6/15/2023, 12:00:05 PM");
    }

    #[test]
    fn date_only_values_are_not_timestamps() {
        assert_eq!(format_locale_timestamp(Some("2023-06-15")), INVALID_DATE);
        assert_eq!(format_locale_timestamp(Some("")), INVALID_DATE);
    }
}
