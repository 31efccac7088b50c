//! Time helpers
//!
//! Token timestamps are millisecond Unix epochs. Daily windows start at UTC
//! midnight.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

/// Current UTC time
pub fn utcnow() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds since the Unix epoch
pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// UTC midnight of the day containing `at`
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// UTC midnight of the current day
pub fn start_of_today() -> DateTime<Utc> {
    start_of_day(utcnow())
}

/// `from` shifted by a whole number of days.
///
/// Returns `None` when the result is not representable.
pub fn days_after(from: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(days).and_then(|delta| from.checked_add_signed(delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_start_of_day() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 12).unwrap();
        let midnight = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
        assert_eq!(start_of_day(at), midnight);
        assert_eq!(start_of_day(midnight), midnight);
    }

    #[test]
    fn test_days_after() {
        let at = Utc.with_ymd_and_hms(2024, 2, 28, 12, 0, 0).unwrap();
        assert_eq!(
            days_after(at, 2),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(days_after(at, -1), Some(Utc.with_ymd_and_hms(2024, 2, 27, 12, 0, 0).unwrap()));
        assert_eq!(days_after(at, i64::MAX), None);
    }

    #[test]
    fn test_to_millis() {
        let at = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(to_millis(at), 1000);
    }
}
