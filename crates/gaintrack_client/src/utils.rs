//! Date parsing for workout timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a stored workout date into a UTC timestamp.
///
/// Accepts:
/// - YYYY-MM-DD (midnight UTC)
/// - RFC3339 datetime, with `T` or a space separator
/// - Naive datetime YYYY-MM-DDTHH:MM:SS[.fff] (interpreted as UTC)
pub fn parse_session_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    let normalized = s.replacen(' ', "T", 1);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(ndt.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_session_date_accepts_date_only() {
        let result = parse_session_date("2025-12-15");
        assert_eq!(result, Utc.with_ymd_and_hms(2025, 12, 15, 0, 0, 0).single());
    }

    #[test]
    fn parse_session_date_accepts_js_iso_strings() {
        let result = parse_session_date("2025-12-15T10:30:00.000Z");
        assert_eq!(result, Utc.with_ymd_and_hms(2025, 12, 15, 10, 30, 0).single());
    }

    #[test]
    fn parse_session_date_converts_offsets_to_utc() {
        let result = parse_session_date("2025-12-15 10:30:00+02:00");
        assert_eq!(result, Utc.with_ymd_and_hms(2025, 12, 15, 8, 30, 0).single());
    }

    #[test]
    fn parse_session_date_accepts_naive_datetime() {
        let result = parse_session_date("2025-12-15T10:30:00");
        assert_eq!(result, Utc.with_ymd_and_hms(2025, 12, 15, 10, 30, 0).single());
        let fractional = parse_session_date("2025-12-15T10:30:00.250");
        assert!(fractional.is_some());
    }

    #[test]
    fn parse_session_date_rejects_invalid() {
        assert!(parse_session_date("not-a-date").is_none());
        assert!(parse_session_date("").is_none());
    }
}
