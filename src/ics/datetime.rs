//! Decoding of the ICS compact date/time encoding (`YYYYMMDD` and
//! `YYYYMMDDTHHMMSS[Z]`) into absolute instants.

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;

/// Decoded DTSTART value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedStart {
    pub date: DateTime<Utc>,
    pub all_day: bool,
}

/// Decode a raw DTSTART field line. The value starts after the first colon,
/// so parameter-qualified lines (`DTSTART;TZID=...:...`) work unchanged.
///
/// Values without a time component become UTC midnight of that date and are
/// flagged all-day. Values ending in `Z` are exact UTC instants. Values with
/// a time but no `Z` are wall-clock time in `timezone`, falling back to the
/// server's local zone when none is configured.
///
/// Returns `None` for missing or malformed values; the caller drops the event.
pub fn parse_date_value(line: &str, timezone: Option<Tz>) -> Option<DecodedStart> {
    let value = line.splitn(2, ':').nth(1)?.trim();
    if value.len() < 8 {
        return None;
    }

    let year: i32 = value.get(0..4)?.parse().ok()?;
    let month: u32 = value.get(4..6)?.parse().ok()?;
    let day: u32 = value.get(6..8)?.parse().ok()?;

    if !value.contains('T') {
        let date = Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()?;
        return Some(DecodedStart { date, all_day: true });
    }

    let hour: u32 = value.get(9..11)?.parse().ok()?;
    let minute: u32 = value.get(11..13)?.parse().ok()?;
    // Seconds default to zero when absent
    let second: u32 = value
        .get(13..15)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    if value.ends_with('Z') {
        let date = Utc.with_ymd_and_hms(year, month, day, hour, minute, second).single()?;
        return Some(DecodedStart { date, all_day: false });
    }

    let date = match timezone {
        Some(tz) => tz
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .earliest()?
            .with_timezone(&Utc),
        None => Local
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .earliest()?
            .with_timezone(&Utc),
    };

    Some(DecodedStart { date, all_day: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_only_is_all_day_utc_midnight() {
        let decoded = parse_date_value("DTSTART:20250615", None).unwrap();
        assert!(decoded.all_day);
        assert_eq!(decoded.date, Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_utc_marker_is_exact_instant() {
        let decoded = parse_date_value("DTSTART:20250615T140000Z", None).unwrap();
        assert!(!decoded.all_day);
        assert_eq!(decoded.date, Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_no_marker_uses_configured_zone() {
        let prague = Some(chrono_tz::Europe::Prague);
        let decoded = parse_date_value("DTSTART;TZID=Europe/Prague:20250615T140000", prague).unwrap();
        assert!(!decoded.all_day);
        // Prague is UTC+2 in June
        assert_eq!(decoded.date, Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_no_marker_defaults_to_server_local_zone() {
        let decoded = parse_date_value("DTSTART:20250615T140000", None).unwrap();
        let expected = Local
            .with_ymd_and_hms(2025, 6, 15, 14, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(decoded.date, expected);
    }

    #[test]
    fn test_missing_seconds_default_to_zero() {
        let decoded = parse_date_value("DTSTART:20250615T1400Z", None).unwrap();
        assert_eq!(decoded.date, Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert_eq!(parse_date_value("DTSTART:2025", None), None);
        assert_eq!(parse_date_value("DTSTART:", None), None);
        assert_eq!(parse_date_value("DTSTART", None), None);
        assert_eq!(parse_date_value("DTSTART:2025061X", None), None);
        // Month out of range
        assert_eq!(parse_date_value("DTSTART:20251315", None), None);
    }
}
