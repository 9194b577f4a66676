//! Date formatting and parsing with fallbacks
//!
//! Console panels show timestamps coming from loosely-typed documents,
//! so every helper here degrades to a placeholder instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Placeholder shown when a value is missing or unparseable
pub const FALLBACK: &str = "—";

/// Panel display format, e.g. "05.08.2026 14:30"
const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Format a timestamp for panel display
pub fn format_display(ts: DateTime<Utc>) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

/// Format an optional timestamp, falling back to the placeholder
pub fn format_optional(ts: Option<DateTime<Utc>>) -> String {
    ts.map(format_display).unwrap_or_else(|| FALLBACK.to_string())
}

/// Parse a timestamp from the formats the documents actually contain:
/// RFC 3339, "YYYY-MM-DD HH:MM:SS", "DD.MM.YYYY HH:MM" and a bare
/// "DD.MM.YYYY" (midnight).
pub fn parse_flexible(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, DISPLAY_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d.%m.%Y") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

/// Re-format a raw document value for display. Invalid input yields the
/// placeholder, never an error.
pub fn format_raw(raw: &str) -> String {
    parse_flexible(raw)
        .map(format_display)
        .unwrap_or_else(|| FALLBACK.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_optional_fallback() {
        assert_eq!(format_optional(None), FALLBACK);
        let ts = Utc.with_ymd_and_hms(2026, 8, 5, 14, 30, 0).unwrap();
        assert_eq!(format_optional(Some(ts)), "05.08.2026 14:30");
    }

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_flexible("2026-08-05T14:30:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 8, 5, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_legacy_formats() {
        assert!(parse_flexible("2026-08-05 14:30:00").is_some());
        assert!(parse_flexible("05.08.2026 14:30").is_some());
        assert!(parse_flexible("05.08.2026").is_some());
    }

    #[test]
    fn test_invalid_input_never_panics() {
        for raw in ["", "  ", "not a date", "32.13.2026", "2026-99-99T00:00:00Z"] {
            assert_eq!(format_raw(raw), FALLBACK, "input: {raw:?}");
        }
    }
}
