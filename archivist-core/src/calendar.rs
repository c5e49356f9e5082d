//! 360-day model calendar and half-open date ranges.
//!
//! Climate model output uses a calendar of 12 months of 30 days each, so a
//! timestamp such as `2000-02-30` is valid here. [`Datetime360`] counts
//! seconds from `0000-01-01T00:00:00` in that calendar.

use std::fmt;
use std::ops::Add;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 12 * DAYS_PER_MONTH;

/// A point in time in the 360-day calendar, with one-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Datetime360(i64);

impl Datetime360 {
    /// Build a timestamp from calendar fields, validating each against the 360-day calendar.
    pub fn new(
        year: i64,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, CoreError> {
        if year < 0 {
            return Err(invalid(format!("year {year} before year 0")));
        }
        if !(1..=12).contains(&month) {
            return Err(invalid(format!("month {month} out of range 1-12")));
        }
        if !(1..=30).contains(&day) {
            return Err(invalid(format!("day {day} out of range 1-30")));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(invalid(format!("time {hour:02}:{minute:02}:{second:02}")));
        }
        let days = year * DAYS_PER_YEAR + (month as i64 - 1) * DAYS_PER_MONTH + (day as i64 - 1);
        Ok(Self(
            days * SECS_PER_DAY
                + hour as i64 * SECS_PER_HOUR
                + minute as i64 * SECS_PER_MINUTE
                + second as i64,
        ))
    }

    /// Midnight at the start of the given day.
    pub fn from_ymd(year: i64, month: u32, day: u32) -> Result<Self, CoreError> {
        Self::new(year, month, day, 0, 0, 0)
    }

    fn days(&self) -> i64 {
        self.0.div_euclid(SECS_PER_DAY)
    }

    fn secs_of_day(&self) -> i64 {
        self.0.rem_euclid(SECS_PER_DAY)
    }

    pub fn year(&self) -> i64 {
        self.days().div_euclid(DAYS_PER_YEAR)
    }

    pub fn month(&self) -> u32 {
        (self.days().rem_euclid(DAYS_PER_YEAR) / DAYS_PER_MONTH) as u32 + 1
    }

    pub fn day(&self) -> u32 {
        (self.days().rem_euclid(DAYS_PER_MONTH)) as u32 + 1
    }

    pub fn hour(&self) -> u32 {
        (self.secs_of_day() / SECS_PER_HOUR) as u32
    }

    pub fn minute(&self) -> u32 {
        (self.secs_of_day() % SECS_PER_HOUR / SECS_PER_MINUTE) as u32
    }

    pub fn second(&self) -> u32 {
        (self.secs_of_day() % SECS_PER_MINUTE) as u32
    }
}

fn invalid(reason: String) -> CoreError {
    CoreError::InvalidTime { reason }
}

impl Add<Duration> for Datetime360 {
    type Output = Datetime360;

    fn add(self, rhs: Duration) -> Self::Output {
        Datetime360(self.0 + rhs.num_seconds())
    }
}

impl fmt::Display for Datetime360 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// A half-open interval `[start, end)`.
///
/// `end` is the start of the period after the last covered sample, so two
/// ranges are contiguous iff `a.end == b.start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Datetime360,
    pub end: Datetime360,
}

impl DateRange {
    pub fn new(start: Datetime360, end: Datetime360) -> Result<Self, CoreError> {
        if end < start {
            return Err(invalid(format!("range end {end} precedes start {start}")));
        }
        Ok(Self { start, end })
    }

    /// `self` ends exactly where `next` begins.
    pub fn is_followed_by(&self, next: &DateRange) -> bool {
        self.end == next.start
    }

    /// `other` lies entirely within `self`.
    pub fn contains_range(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The two ranges share at least one instant.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i64, m: u32, d: u32) -> Datetime360 {
        Datetime360::from_ymd(y, m, d).expect("valid date")
    }

    #[test]
    fn february_thirtieth_is_valid() {
        let t = ymd(2000, 2, 30);
        assert_eq!((t.year(), t.month(), t.day()), (2000, 2, 30));
    }

    #[test]
    fn rejects_out_of_calendar_fields() {
        assert!(Datetime360::from_ymd(2000, 13, 1).is_err());
        assert!(Datetime360::from_ymd(2000, 1, 31).is_err());
        assert!(Datetime360::from_ymd(2000, 0, 1).is_err());
        assert!(Datetime360::new(2000, 1, 1, 24, 0, 0).is_err());
    }

    #[test]
    fn last_day_plus_one_day_rolls_into_next_year() {
        assert_eq!(ymd(2049, 12, 30) + Duration::days(1), ymd(2050, 1, 1));
    }

    #[test]
    fn year_rollover_is_360_days() {
        assert_eq!(ymd(2029, 1, 1) + Duration::days(360), ymd(2030, 1, 1));
    }

    #[test]
    fn sub_daily_rollover() {
        let t = Datetime360::new(2009, 12, 30, 18, 0, 0).unwrap();
        assert_eq!(t + Duration::hours(6), ymd(2010, 1, 1));
    }

    #[test]
    fn display_is_iso_like() {
        let t = Datetime360::new(1960, 2, 30, 6, 5, 4).unwrap();
        assert_eq!(t.to_string(), "1960-02-30T06:05:04");
    }

    #[test]
    fn range_relations() {
        let a = DateRange::new(ymd(1960, 1, 1), ymd(2050, 1, 1)).unwrap();
        let b = DateRange::new(ymd(2050, 1, 1), ymd(2070, 1, 1)).unwrap();
        let c = DateRange::new(ymd(2010, 1, 1), ymd(2020, 1, 1)).unwrap();
        assert!(a.is_followed_by(&b));
        assert!(!a.overlaps(&b));
        assert!(a.contains_range(&c));
        assert!(a.overlaps(&c));
        assert_eq!(a.union(&b), DateRange::new(ymd(1960, 1, 1), ymd(2070, 1, 1)).unwrap());
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(DateRange::new(ymd(2001, 1, 1), ymd(2000, 1, 1)).is_err());
    }

    proptest! {
        #[test]
        fn fields_round_trip(
            y in 0i64..3000,
            m in 1u32..=12,
            d in 1u32..=30,
            h in 0u32..24,
            mi in 0u32..60,
            s in 0u32..60,
        ) {
            let t = Datetime360::new(y, m, d, h, mi, s).unwrap();
            prop_assert_eq!(
                (t.year(), t.month(), t.day(), t.hour(), t.minute(), t.second()),
                (y, m, d, h, mi, s)
            );
        }
    }
}
