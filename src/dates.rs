//! Local-calendar helpers.
//!
//! Instants are stored in UTC; every "same day" question is answered in the
//! local time zone of the process.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// The local calendar date of an instant.
#[must_use]
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Whether two instants fall on the same local calendar date.
#[must_use]
pub fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    local_date(a) == local_date(b)
}

/// Interpret a naive wall-clock time in the local zone.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times that
/// do not exist locally (DST spring-forward) are read as UTC.
#[must_use]
pub fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
}

/// 23:59 local time on `date`.
#[must_use]
pub fn end_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
    local_to_utc(date.and_time(time))
}

/// Parse a naive local timestamp as written by manual entry
/// (`YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS`, `T` or space separated).
#[must_use]
pub fn parse_local_naive(text: &str) -> Option<DateTime<Utc>> {
    const FORMATS: [&str; 4] =
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    let text = text.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(local_to_utc)
}

/// Parse a deadline given either as RFC 3339, a naive local timestamp, or a
/// bare date (read as the end of that local day).
#[must_use]
pub fn parse_deadline(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_local_naive(text) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().map(end_of_local_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, Timelike};

    #[test]
    fn test_end_of_local_day_is_2359_local() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let local = end_of_local_day(date).with_timezone(&Local);
        assert_eq!(local.date_naive(), date);
        assert_eq!((local.hour(), local.minute()), (23, 59));
    }

    #[test]
    fn test_same_local_day() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let late = end_of_local_day(date);
        let earlier = late - Duration::hours(10);
        let next_day = late + Duration::minutes(2);
        assert!(same_local_day(late, earlier));
        assert!(!same_local_day(late, next_day));
    }

    #[test]
    fn test_parse_local_naive_variants() {
        let a = parse_local_naive("2025-01-15T10:00:00").unwrap();
        let b = parse_local_naive("2025-01-15T10:00").unwrap();
        let c = parse_local_naive("2025-01-15 10:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        let local = a.with_timezone(&Local);
        assert_eq!((local.year(), local.month(), local.day(), local.hour()), (2025, 1, 15, 10));
    }

    #[test]
    fn test_parse_deadline_rfc3339() {
        let dt = parse_deadline("2025-01-15T10:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_deadline_bare_date() {
        let dt = parse_deadline("2025-01-15").unwrap();
        let local = dt.with_timezone(&Local);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(local.hour(), 23);
    }

    #[test]
    fn test_parse_deadline_garbage() {
        assert!(parse_deadline("next tuesday-ish").is_none());
        assert!(parse_deadline("").is_none());
    }
}
