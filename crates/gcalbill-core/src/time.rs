//! Date and time helpers for billing periods.
//!
//! This module provides [`DateRange`] for the inclusive-exclusive billing
//! period given on the command line, [`TimeWindow`] for the UTC query range
//! sent to the calendar provider, and the hour rounding rule applied to event
//! durations.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Layout of a calendar day key (`YYYY-MM-DD`).
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Formats a date as a calendar day key.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` date as given on the command line.
pub fn parse_day(input: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DAY_KEY_FORMAT)
        .map_err(|e| CoreError::invalid_date(input, e.to_string()))
}

/// Rounds a duration to whole hours, halfway values away from zero.
///
/// 1h29m rounds to 1, 1h30m to 2 and -1h30m to -2.
pub fn round_to_hours(duration: Duration) -> i64 {
    let millis = duration.num_milliseconds();
    let hours = millis / MILLIS_PER_HOUR;
    let rem = millis % MILLIS_PER_HOUR;
    if rem.abs() * 2 >= MILLIS_PER_HOUR {
        hours + rem.signum()
    } else {
        hours
    }
}

/// A billing period `[start, end)` expressed in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the period (inclusive).
    pub start: NaiveDate,
    /// Day after the period (exclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting an end that precedes the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if end < start {
            return Err(CoreError::InvalidRange {
                start: day_key(start),
                end: day_key(end),
            });
        }
        Ok(Self { start, end })
    }

    /// The default billing period: the whole month preceding `today`.
    pub fn previous_month(today: NaiveDate) -> Self {
        let end = today.with_day(1).unwrap_or(today);
        let start = end
            .pred_opt()
            .and_then(|last| last.with_day(1))
            .unwrap_or(end);
        Self { start, end }
    }

    /// Builds a range from optional overrides, defaulting each bound to the
    /// previous month relative to `today`.
    pub fn from_overrides(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> CoreResult<Self> {
        let default = Self::previous_month(today);
        Self::new(start.unwrap_or(default.start), end.unwrap_or(default.end))
    }

    /// Converts the period to a UTC window, each bound being local midnight
    /// in `tz`.
    pub fn to_window<Tz: TimeZone>(&self, tz: &Tz) -> CoreResult<TimeWindow> {
        Ok(TimeWindow::new(
            local_midnight(self.start, tz)?,
            local_midnight(self.end, tz)?,
        ))
    }
}

/// Step used to walk past a daylight saving gap.
const GAP_STEP_MINUTES: i64 = 15;

/// Longest gap walked over before giving up.
const MAX_GAP_MINUTES: i64 = 3 * 60;

/// Start of `date` in `tz`, as UTC.
///
/// An ambiguous midnight resolves to the earlier instant. When the clocks
/// skip midnight, the first local time that exists after it is used.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> CoreResult<DateTime<Utc>> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    (0..=MAX_GAP_MINUTES)
        .step_by(GAP_STEP_MINUTES as usize)
        .find_map(|offset| {
            tz.from_local_datetime(&(midnight + Duration::minutes(offset)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CoreError::UnresolvableLocalTime {
            date: day_key(date),
        })
}

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod rounding {
        use super::*;

        #[test]
        fn rounds_below_half_down() {
            assert_eq!(round_to_hours(Duration::minutes(89)), 1);
            assert_eq!(round_to_hours(Duration::minutes(29)), 0);
        }

        #[test]
        fn rounds_half_away_from_zero() {
            assert_eq!(round_to_hours(Duration::minutes(90)), 2);
            assert_eq!(round_to_hours(Duration::minutes(30)), 1);
            assert_eq!(round_to_hours(Duration::minutes(150)), 3);
            assert_eq!(round_to_hours(Duration::minutes(-90)), -2);
        }

        #[test]
        fn rounds_above_half_up() {
            assert_eq!(round_to_hours(Duration::minutes(91)), 2);
        }

        #[test]
        fn zero_and_negative_durations() {
            assert_eq!(round_to_hours(Duration::zero()), 0);
            assert_eq!(round_to_hours(Duration::minutes(-20)), 0);
            assert_eq!(round_to_hours(Duration::hours(-3)), -3);
        }
    }

    mod date_range {
        use super::*;

        #[test]
        fn previous_month_mid_month() {
            let range = DateRange::previous_month(date(2024, 3, 17));
            assert_eq!(range.start, date(2024, 2, 1));
            assert_eq!(range.end, date(2024, 3, 1));
        }

        #[test]
        fn previous_month_wraps_year() {
            let range = DateRange::previous_month(date(2024, 1, 1));
            assert_eq!(range.start, date(2023, 12, 1));
            assert_eq!(range.end, date(2024, 1, 1));
        }

        #[test]
        fn rejects_end_before_start() {
            let err = DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
            assert!(matches!(err, CoreError::InvalidRange { .. }));
            assert!(err.to_string().contains("2024-01-01"));
        }

        #[test]
        fn empty_range_is_allowed() {
            let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
            let window = range.to_window(&Utc).unwrap();
            assert_eq!(window.start, window.end);
        }

        #[test]
        fn overrides_fill_missing_bounds() {
            let range =
                DateRange::from_overrides(Some(date(2024, 1, 15)), None, date(2024, 3, 10))
                    .unwrap();
            assert_eq!(range.start, date(2024, 1, 15));
            assert_eq!(range.end, date(2024, 3, 1));
        }

        #[test]
        fn window_uses_local_midnight() {
            let tz = FixedOffset::east_opt(2 * 3600).unwrap();
            let range = DateRange::new(date(2024, 1, 1), date(2024, 2, 1)).unwrap();
            let window = range.to_window(&tz).unwrap();
            assert_eq!(window.start, utc(2023, 12, 31, 22, 0, 0));
            assert_eq!(window.end, utc(2024, 1, 31, 22, 0, 0));
        }

        #[test]
        fn window_skips_missing_midnight() {
            // Santiago moves from 00:00 -04 straight to 01:00 -03 on 2024-09-08.
            let range = DateRange::new(date(2024, 9, 8), date(2024, 10, 1)).unwrap();
            let window = range.to_window(&chrono_tz::America::Santiago).unwrap();
            assert_eq!(window.start, utc(2024, 9, 8, 4, 0, 0));
            assert_eq!(window.end, utc(2024, 10, 1, 3, 0, 0));
        }
    }

    #[test]
    fn parse_day_accepts_padded_input() {
        assert_eq!(parse_day(" 2024-05-01 ").unwrap(), date(2024, 5, 1));
    }

    #[test]
    fn parse_day_rejects_garbage() {
        let err = parse_day("05/01/2024").unwrap_err();
        assert!(err.to_string().contains("05/01/2024"));
    }

    #[test]
    fn day_key_format() {
        assert_eq!(day_key(date(2024, 1, 5)), "2024-01-05");
    }

    #[test]
    #[should_panic(expected = "start must be <= end")]
    fn invalid_window() {
        TimeWindow::new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
    }
}
