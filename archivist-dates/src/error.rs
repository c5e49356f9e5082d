//! Error types for archivist-dates.

use thiserror::Error;

use archivist_core::CoreError;

/// Errors from deriving a date range from output filenames.
#[derive(Debug, Error)]
pub enum DateRangeError {
    #[error("unknown output frequency '{0}'")]
    UnknownFrequency(String),

    #[error("none of the {count} file(s) match the output filename pattern")]
    NoMatchingFiles { count: usize },

    #[error("file '{file}': datestamp '{value}' does not fit the {frequency} format")]
    InvalidDatestamp {
        file: String,
        value: String,
        frequency: String,
    },

    #[error("invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("filename pattern lacks the named capture '{0}'")]
    MissingCapture(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),
}
