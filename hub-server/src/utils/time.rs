//! Time helpers
//!
//! Restaurants keep opening hours as local `"HH:MM"` strings together with
//! a fixed UTC offset in minutes. All instants are UTC epoch milliseconds.

use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use shared::{AppError, AppResult};

const MINUTE_MS: i64 = 60_000;

/// Parse `"HH:MM"` (24h) into minutes since midnight
pub fn parse_hhmm(s: &str) -> Option<u32> {
    let t = NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()?;
    Some(t.hour() * 60 + t.minute())
}

/// Validate an `"HH:MM"` field
pub fn validate_hhmm(field: &str, value: &str) -> AppResult<u32> {
    parse_hhmm(value).ok_or_else(|| {
        AppError::validation(format!("{field} must be HH:MM (24h), got '{value}'"))
            .with_detail("field", field)
    })
}

/// Local wall-clock time of `millis` at `utc_offset_minutes`
pub fn local_datetime(millis: i64, utc_offset_minutes: i32) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis + i64::from(utc_offset_minutes) * MINUTE_MS)
}

/// Minutes since local midnight
pub fn local_minute_of_day(millis: i64, utc_offset_minutes: i32) -> Option<u32> {
    local_datetime(millis, utc_offset_minutes).map(|dt| dt.hour() * 60 + dt.minute())
}

/// Local calendar day as `YYYYMMDD`
pub fn local_day_stamp(millis: i64, utc_offset_minutes: i32) -> String {
    local_datetime(millis, utc_offset_minutes)
        .map(|dt| dt.format("%Y%m%d").to_string())
        .unwrap_or_else(|| "19700101".to_string())
}

/// Whether `minute` (since midnight) lies in `[opening, closing)`
///
/// `closing < opening` wraps past midnight; `closing == opening` is open
/// around the clock.
pub fn is_within_hours(minute: u32, opening: u32, closing: u32) -> bool {
    match opening.cmp(&closing) {
        std::cmp::Ordering::Equal => true,
        std::cmp::Ordering::Less => minute >= opening && minute < closing,
        std::cmp::Ordering::Greater => minute >= opening || minute < closing,
    }
}

/// `millis` plus whole minutes
pub fn plus_minutes(millis: i64, minutes: i64) -> i64 {
    millis + Duration::minutes(minutes).num_milliseconds()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clock_times() {
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("09:30"), Some(570));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("9am"), None);
    }

    #[test]
    fn hours_with_midnight_wrap() {
        // 09:00 - 22:00
        assert!(is_within_hours(9 * 60, 540, 1320));
        assert!(!is_within_hours(22 * 60, 540, 1320));
        assert!(!is_within_hours(8 * 60 + 59, 540, 1320));

        // 18:00 - 02:00
        assert!(is_within_hours(23 * 60, 1080, 120));
        assert!(is_within_hours(60, 1080, 120));
        assert!(!is_within_hours(120, 1080, 120));
        assert!(!is_within_hours(12 * 60, 1080, 120));

        // Equal times: 24h
        assert!(is_within_hours(3 * 60, 600, 600));
    }

    #[test]
    fn offset_shifts_local_time() {
        // 2026-01-01T23:30:00Z
        let millis = 1_767_310_200_000;
        assert_eq!(local_minute_of_day(millis, 0), Some(23 * 60 + 30));
        assert_eq!(local_minute_of_day(millis, 60), Some(30));
        assert_eq!(local_day_stamp(millis, 0), "20260101");
        assert_eq!(local_day_stamp(millis, 60), "20260102");
        assert_eq!(local_day_stamp(millis, -330), "20260101");
    }
}
