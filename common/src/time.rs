//! Time utilities for the ledger.
//!
//! Day boundaries are computed in UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// A timestamp, always UTC.
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Calendar day a timestamp falls on.
pub fn day_of(timestamp: Timestamp) -> NaiveDate {
    timestamp.date_naive()
}

/// First instant of a day.
pub fn start_of_day(day: NaiveDate) -> Timestamp {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Last representable instant of a day.
pub fn end_of_day(day: NaiveDate) -> Timestamp {
    start_of_day(day) + Duration::days(1) - Duration::nanoseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_bounds() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

        assert_eq!(start_of_day(day), Utc.with_ymd_and_hms(2025, 5, 5, 0, 0, 0).unwrap());

        let end = end_of_day(day);
        assert_eq!(day_of(end), day);
        assert_eq!(day_of(end + Duration::nanoseconds(1)), day.succ_opt().unwrap());
    }
}
