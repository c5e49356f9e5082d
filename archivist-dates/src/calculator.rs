//! Time coverage of a batch of output files.
//!
//! `date_range(files, frequency)` summarises the half-open range covered by
//! a set of files that upstream quality control has already declared
//! contiguous. It widens a running `[start, end)` over every file; it does
//! not check for gaps.

use archivist_core::{DateRange, Datetime360};
use chrono::Duration;
use regex::Regex;

use crate::error::DateRangeError;
use crate::frequency::{Frequency, Rollover};

/// CMIP-style output filename:
/// `<var>_<table>_<model>_<experiment>_<variant>_<grid>_<start>-<end>.nc`.
pub const OUTPUT_FILENAME_PATTERN: &str = concat!(
    r"(?P<out_var_name>[a-zA-Z0-9-]+)_(?P<mip_table_id>[a-zA-Z0-9-]+)_",
    r"(?P<model_id>[a-zA-Z0-9-]+)_(?P<experiment_id>[a-zA-Z0-9-]+)_",
    r"(?P<variant_label>[a-zA-Z0-9-]+)_(?P<grid_label>[a-zA-Z0-9-]+)_",
    r"(?P<start_date>[0-9]+)-(?P<end_date>[0-9]+)\.nc$",
);

/// A filename pattern with `start_date` and `end_date` captures.
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    regex: Regex,
}

impl FilenamePattern {
    pub fn new(pattern: &str) -> Result<Self, DateRangeError> {
        let regex = Regex::new(pattern)?;
        for capture in ["start_date", "end_date"] {
            if !regex.capture_names().flatten().any(|n| n == capture) {
                return Err(DateRangeError::MissingCapture(capture));
            }
        }
        Ok(Self { regex })
    }

    /// Raw `(start_date, end_date)` strings, if `file` matches.
    pub fn datestamps<'a>(&self, file: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.regex.captures(file)?;
        Some((caps.name("start_date")?.as_str(), caps.name("end_date")?.as_str()))
    }

    pub fn is_match(&self, file: &str) -> bool {
        self.regex.is_match(file)
    }
}

impl Default for FilenamePattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(OUTPUT_FILENAME_PATTERN).expect("built-in pattern compiles"),
        }
    }
}

/// Derives the coverage `[start, end)` of a batch of files.
#[derive(Debug, Clone, Default)]
pub struct DateRangeCalculator {
    pattern: FilenamePattern,
}

impl DateRangeCalculator {
    pub fn new(pattern: FilenamePattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &FilenamePattern {
        &self.pattern
    }

    /// Coverage of `files` at `frequency`.
    ///
    /// Files not matching the pattern are skipped. A matching file whose
    /// datestamps do not fit the frequency's format is an error.
    pub fn date_range<S: AsRef<str>>(
        &self,
        files: &[S],
        frequency: Frequency,
    ) -> Result<DateRange, DateRangeError> {
        let matching: Vec<(&str, &str, &str)> = files
            .iter()
            .map(|f| f.as_ref())
            .filter_map(|file| match self.pattern.datestamps(file) {
                Some((start, end)) => Some((file, start, end)),
                None => {
                    tracing::debug!("skipping non-matching file: {file}");
                    None
                }
            })
            .collect();

        let (Some(first), Some(last)) = (matching.first(), matching.last()) else {
            return Err(DateRangeError::NoMatchingFiles { count: files.len() });
        };

        let rollover = match frequency.rollover() {
            Rollover::Fixed(duration) => duration,
            Rollover::FromLastFile => {
                let end = parse(last.0, last.2, frequency)?;
                Duration::minutes(60 - end.minute() as i64)
            }
        };

        let mut running_start = parse(first.0, first.1, frequency)?;
        let mut running_end = parse(first.0, first.2, frequency)? + rollover;

        for (file, start, end) in &matching {
            running_start = running_start.min(parse(file, start, frequency)?);
            running_end = running_end.max(parse(file, end, frequency)? + rollover);
        }

        Ok(DateRange::new(running_start, running_end)?)
    }
}

fn parse(file: &str, value: &str, frequency: Frequency) -> Result<Datetime360, DateRangeError> {
    frequency
        .datestamp_format()
        .parse(value)
        .ok_or_else(|| DateRangeError::InvalidDatestamp {
            file: file.to_owned(),
            value: value.to_owned(),
            frequency: frequency.to_string(),
        })
}
