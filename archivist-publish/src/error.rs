//! Error types for archivist-publish.

use std::path::PathBuf;

use thiserror::Error;

use archivist_core::{CoreError, VersionState};
use archivist_dates::DateRangeError;
use archivist_transport::TransportError;

use crate::planner::PublicationMode;

/// All errors that can arise while planning or carrying out a publication.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("date range error: {0}")]
    Dates(#[from] DateRangeError),

    #[error("archive error: {0}")]
    Transport(#[from] TransportError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Emission was asked for a mode that must not be published.
    #[error("{variable}: {} ({mode})", .mode.description())]
    InvalidMode {
        variable: String,
        mode: PublicationMode,
    },

    #[error("illegal lifecycle transition {from} -> {to}")]
    IllegalTransition { from: VersionState, to: VersionState },
}

/// Convenience constructor for [`PublishError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.into(),
        source,
    }
}
