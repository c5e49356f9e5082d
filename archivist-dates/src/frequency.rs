//! Output frequencies: filename datestamp format and range rollover.

use std::fmt;
use std::str::FromStr;

use archivist_core::Datetime360;
use chrono::Duration;

use crate::error::DateRangeError;

/// Datestamp layout used in output filenames for a frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatestampFormat {
    /// `YYYY`
    Year,
    /// `YYYYMM`
    YearMonth,
    /// `YYYYMMDD`
    YearMonthDay,
    /// `YYYYMMDDhhmm`
    Minute,
    /// `YYYYMMDDhhmmss`
    Second,
}

impl DatestampFormat {
    pub fn width(self) -> usize {
        match self {
            DatestampFormat::Year => 4,
            DatestampFormat::YearMonth => 6,
            DatestampFormat::YearMonthDay => 8,
            DatestampFormat::Minute => 12,
            DatestampFormat::Second => 14,
        }
    }

    /// Parse `value` into a 360-day timestamp. Missing fields default to the
    /// start of the period (month 1, day 1, 00:00:00).
    pub fn parse(self, value: &str) -> Option<Datetime360> {
        if value.len() != self.width() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let field = |range: std::ops::Range<usize>| -> Option<u32> {
            value.get(range).and_then(|s| s.parse().ok())
        };
        let year = value.get(0..4)?.parse::<i64>().ok()?;
        let month = if self.width() >= 6 { field(4..6)? } else { 1 };
        let day = if self.width() >= 8 { field(6..8)? } else { 1 };
        let hour = if self.width() >= 12 { field(8..10)? } else { 0 };
        let minute = if self.width() >= 12 { field(10..12)? } else { 0 };
        let second = if self.width() >= 14 { field(12..14)? } else { 0 };
        Datetime360::new(year, month, day, hour, minute, second).ok()
    }
}

/// How far past a file's end datestamp its coverage extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    Fixed(Duration),
    /// Sub-hourly instantaneous output: the sampling step is not known up
    /// front, so it is read from the minute field of the last file's end.
    FromLastFile,
}

/// Output frequency of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Yr,
    YrPt,
    Dec,
    Mon,
    MonC,
    Day,
    SixHr,
    SixHrPt,
    ThreeHr,
    ThreeHrPt,
    OneHr,
    OneHrCM,
    OneHrPt,
    SubhrPt,
}

impl Frequency {
    pub const ALL: [Frequency; 14] = [
        Frequency::Yr,
        Frequency::YrPt,
        Frequency::Dec,
        Frequency::Mon,
        Frequency::MonC,
        Frequency::Day,
        Frequency::SixHr,
        Frequency::SixHrPt,
        Frequency::ThreeHr,
        Frequency::ThreeHrPt,
        Frequency::OneHr,
        Frequency::OneHrCM,
        Frequency::OneHrPt,
        Frequency::SubhrPt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Yr => "yr",
            Frequency::YrPt => "yrPt",
            Frequency::Dec => "dec",
            Frequency::Mon => "mon",
            Frequency::MonC => "monC",
            Frequency::Day => "day",
            Frequency::SixHr => "6hr",
            Frequency::SixHrPt => "6hrPt",
            Frequency::ThreeHr => "3hr",
            Frequency::ThreeHrPt => "3hrPt",
            Frequency::OneHr => "1hr",
            Frequency::OneHrCM => "1hrCM",
            Frequency::OneHrPt => "1hrPt",
            Frequency::SubhrPt => "subhrPt",
        }
    }

    pub fn datestamp_format(self) -> DatestampFormat {
        match self {
            Frequency::Yr | Frequency::YrPt | Frequency::Dec => DatestampFormat::Year,
            Frequency::Mon | Frequency::MonC => DatestampFormat::YearMonth,
            Frequency::Day => DatestampFormat::YearMonthDay,
            Frequency::SubhrPt => DatestampFormat::Second,
            _ => DatestampFormat::Minute,
        }
    }

    pub fn rollover(self) -> Rollover {
        match self {
            // Decadal files are named by year and roll over like yearly ones.
            Frequency::Yr | Frequency::YrPt | Frequency::Dec => {
                Rollover::Fixed(Duration::days(360))
            }
            Frequency::Mon | Frequency::MonC => Rollover::Fixed(Duration::days(30)),
            Frequency::Day => Rollover::Fixed(Duration::days(1)),
            Frequency::SixHr | Frequency::SixHrPt => Rollover::Fixed(Duration::hours(6)),
            Frequency::ThreeHr | Frequency::ThreeHrPt => Rollover::Fixed(Duration::hours(3)),
            Frequency::OneHr | Frequency::OneHrCM | Frequency::OneHrPt => {
                Rollover::Fixed(Duration::hours(1))
            }
            Frequency::SubhrPt => Rollover::FromLastFile,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = DateRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|f| f.label() == s)
            .ok_or_else(|| DateRangeError::UnknownFrequency(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for f in Frequency::ALL {
            assert_eq!(f.label().parse::<Frequency>().unwrap(), f);
        }
        assert!(matches!(
            "fortnightly".parse::<Frequency>(),
            Err(DateRangeError::UnknownFrequency(_))
        ));
    }

    #[test]
    fn parse_fills_missing_fields_with_period_start() {
        let t = DatestampFormat::YearMonth.parse("205912").unwrap();
        assert_eq!(t, Datetime360::from_ymd(2059, 12, 1).unwrap());
        let t = DatestampFormat::Year.parse("2029").unwrap();
        assert_eq!(t, Datetime360::from_ymd(2029, 1, 1).unwrap());
    }

    #[test]
    fn parse_reads_time_of_day() {
        let t = DatestampFormat::Second.parse("20091230234000").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (23, 40, 0));
    }

    #[test]
    fn parse_rejects_wrong_width_and_non_digits() {
        assert!(DatestampFormat::YearMonthDay.parse("200001").is_none());
        assert!(DatestampFormat::YearMonth.parse("2000ab").is_none());
        assert!(DatestampFormat::YearMonth.parse("200013").is_none());
    }

    #[test]
    fn only_subhourly_derives_rollover_from_data() {
        for f in Frequency::ALL {
            let derived = matches!(f.rollover(), Rollover::FromLastFile);
            assert_eq!(derived, f == Frequency::SubhrPt, "{f}");
        }
    }
}
