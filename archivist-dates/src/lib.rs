//! Time coverage of output files, derived from their filenames.
//!
//! [`DateRangeCalculator::date_range`] parses the `start_date`/`end_date`
//! fields of every matching filename using the datestamp format of the
//! variable's [`Frequency`] and returns the half-open range they cover.

pub mod calculator;
pub mod error;
pub mod frequency;

pub use calculator::{DateRangeCalculator, FilenamePattern, OUTPUT_FILENAME_PATTERN};
pub use error::DateRangeError;
pub use frequency::{DatestampFormat, Frequency, Rollover};
