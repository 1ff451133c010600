//! Calendar fields derived from a session's seat-in time

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Day/week/month/year bucket a session is reported under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    /// English day name, e.g. "Friday"
    pub day_of_week: String,
    /// ISO 8601 week number
    pub week_number: i32,
    /// 1 through 12
    pub month: i32,
    pub year: i32,
}

impl CalendarFields {
    /// Bucket a timestamp by the club's local day
    pub fn derive(timestamp: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = timestamp.with_timezone(&offset);
        Self {
            day_of_week: local.format("%A").to_string(),
            week_number: local.iso_week().week() as i32,
            month: local.month() as i32,
            year: local.year(),
        }
    }
}

/// The club-local calendar date of a timestamp
pub fn local_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

/// Build a fixed offset from minutes east of UTC, clamped to ±24h
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    let seconds = minutes.clamp(-24 * 60 + 1, 24 * 60 - 1) * 60;
    FixedOffset::east_opt(seconds).unwrap_or_else(utc)
}

pub fn utc() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_derive_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 8, 21, 15, 0).unwrap();
        let fields = CalendarFields::derive(ts, utc());
        assert_eq!(fields.day_of_week, "Friday");
        assert_eq!(fields.week_number, 10);
        assert_eq!(fields.month, 3);
        assert_eq!(fields.year, 2024);
    }

    #[test]
    fn test_derive_uses_local_day() {
        // 02:00 UTC on New Year's Day is still Dec 31 in UTC-5
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 2, 0, 0).unwrap();
        let fields = CalendarFields::derive(ts, offset_from_minutes(-5 * 60));
        assert_eq!(fields.day_of_week, "Tuesday");
        assert_eq!(fields.month, 12);
        assert_eq!(fields.year, 2024);
        assert_eq!(fields.week_number, 1);
        assert_eq!(
            local_date(ts, offset_from_minutes(-300)),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_offset_clamped() {
        assert_eq!(offset_from_minutes(0), utc());
        assert_eq!(offset_from_minutes(120).local_minus_utc(), 7200);
        assert_eq!(offset_from_minutes(100_000).local_minus_utc(), (24 * 60 - 1) * 60);
    }
}
