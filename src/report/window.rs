//! Report windows and calendar boundaries
//!
//! All boundaries are computed in UTC. Weeks start on Sunday.

use crate::report::error::{ReportError, ReportResult};
use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// Milliseconds in one day
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Which end of a window a parsed bound belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// A closed time interval `[since, until]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl ReportWindow {
    /// Create a window, rejecting `since > until`
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> ReportResult<Self> {
        if since > until {
            return Err(ReportError::InvalidArgument(format!(
                "since ({}) must not be after until ({})",
                since.to_rfc3339(),
                until.to_rfc3339()
            )));
        }
        Ok(Self { since, until })
    }

    /// One calendar month ending at `until`
    pub fn last_month(until: DateTime<Utc>) -> Self {
        let since = until
            .checked_sub_months(Months::new(1))
            .unwrap_or(until - Duration::days(30));
        Self { since, until }
    }

    /// Resolve optional query bounds against `now`
    ///
    /// Missing `until` means `now`; missing `since` means one calendar month
    /// before `until`.
    pub fn resolve(
        since: Option<&str>,
        until: Option<&str>,
        now: DateTime<Utc>,
    ) -> ReportResult<Self> {
        let until = match until {
            Some(s) => parse_bound(s, Bound::End)?,
            None => now,
        };

        match since {
            Some(s) => Self::new(parse_bound(s, Bound::Start)?, until),
            None => Ok(Self::last_month(until)),
        }
    }

    /// Window length in fractional days
    pub fn days(&self) -> f64 {
        (self.until - self.since).num_milliseconds() as f64 / MILLIS_PER_DAY as f64
    }
}

/// Parse an ISO-8601 date or datetime query bound
///
/// Accepts RFC 3339 (`2024-03-01T08:00:00Z`), a naive datetime taken as UTC
/// (`2024-03-01T08:00:00`), or a calendar date (`2024-03-01`). A bare date
/// used as an end bound covers the whole day.
pub fn parse_bound(input: &str, bound: Bound) -> ReportResult<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let start = date_start(date);
        return Ok(match bound {
            Bound::Start => start,
            Bound::End => end_of_day(start),
        });
    }

    Err(ReportError::InvalidArgument(format!(
        "Invalid date: {}. Use ISO-8601 (YYYY-MM-DD or RFC 3339)",
        input
    )))
}

fn date_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Midnight at the start of `t`'s day
pub fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    date_start(t.date_naive())
}

/// Last millisecond of `t`'s day
pub fn end_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(t) + Duration::milliseconds(MILLIS_PER_DAY - 1)
}

/// Midnight of the most recent Sunday at or before `t`
pub fn start_of_week(t: DateTime<Utc>) -> DateTime<Utc> {
    let date = t.date_naive();
    let back = date.weekday().num_days_from_sunday() as u64;
    let sunday = date.checked_sub_days(Days::new(back)).unwrap_or(date);
    date_start(sunday)
}

/// Midnight on the first day of `t`'s month
pub fn start_of_month(t: DateTime<Utc>) -> DateTime<Utc> {
    let date = t.date_naive();
    let first = date.with_day(1).unwrap_or(date);
    date_start(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_day_boundaries() {
        let t = utc(2024, 3, 13, 15, 30, 0);
        assert_eq!(start_of_day(t), utc(2024, 3, 13, 0, 0, 0));
        assert_eq!(
            end_of_day(t),
            utc(2024, 3, 13, 23, 59, 59) + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_start_of_week_is_sunday() {
        // 2024-03-13 is a Wednesday
        assert_eq!(
            start_of_week(utc(2024, 3, 13, 15, 0, 0)),
            utc(2024, 3, 10, 0, 0, 0)
        );
        // A Sunday is its own week start
        assert_eq!(
            start_of_week(utc(2024, 3, 10, 23, 0, 0)),
            utc(2024, 3, 10, 0, 0, 0)
        );
        // Across a month boundary
        assert_eq!(
            start_of_week(utc(2024, 3, 1, 9, 0, 0)),
            utc(2024, 2, 25, 0, 0, 0)
        );
    }

    #[test]
    fn test_start_of_month() {
        assert_eq!(
            start_of_month(utc(2024, 2, 29, 12, 0, 0)),
            utc(2024, 2, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_parse_bound_formats() {
        assert_eq!(
            parse_bound("2024-03-01T08:00:00Z", Bound::Start).unwrap(),
            utc(2024, 3, 1, 8, 0, 0)
        );
        assert_eq!(
            parse_bound("2024-03-01T08:00:00+02:00", Bound::Start).unwrap(),
            utc(2024, 3, 1, 6, 0, 0)
        );
        assert_eq!(
            parse_bound("2024-03-01T08:00:00", Bound::End).unwrap(),
            utc(2024, 3, 1, 8, 0, 0)
        );
        assert_eq!(
            parse_bound("2024-03-01", Bound::Start).unwrap(),
            utc(2024, 3, 1, 0, 0, 0)
        );
        assert_eq!(
            parse_bound("2024-03-01", Bound::End).unwrap(),
            end_of_day(utc(2024, 3, 1, 0, 0, 0))
        );
        assert!(matches!(
            parse_bound("last tuesday", Bound::Start),
            Err(ReportError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_resolve_defaults_to_last_month() {
        let now = utc(2024, 3, 31, 12, 0, 0);
        let window = ReportWindow::resolve(None, None, now).unwrap();
        assert_eq!(window.until, now);
        assert_eq!(window.since, utc(2024, 2, 29, 12, 0, 0));
    }

    #[test]
    fn test_resolve_explicit_since_is_kept() {
        let now = utc(2024, 3, 31, 12, 0, 0);
        let window = ReportWindow::resolve(Some("2024-03-20"), Some("2024-03-25"), now).unwrap();
        assert_eq!(window.since, utc(2024, 3, 20, 0, 0, 0));
        assert_eq!(window.until, end_of_day(utc(2024, 3, 25, 0, 0, 0)));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let now = utc(2024, 3, 31, 12, 0, 0);
        let err = ReportWindow::resolve(Some("2024-03-25"), Some("2024-03-20"), now).unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));
    }

    #[test]
    fn test_window_days() {
        let since = utc(2024, 3, 1, 0, 0, 0);
        let window = ReportWindow::new(since, since + Duration::hours(36)).unwrap();
        assert!((window.days() - 1.5).abs() < f64::EPSILON);

        let instant = ReportWindow::new(since, since).unwrap();
        assert_eq!(instant.days(), 0.0);
    }
}
