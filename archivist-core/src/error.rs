//! Error types for archivist-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from core domain operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse request at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The request descriptor did not exist at the given path.
    #[error("request not found at {path}")]
    RequestNotFound { path: PathBuf },

    /// A version identifier that is not of the form `vYYYYMMDD`.
    #[error("invalid datestamp '{value}'; expected vYYYYMMDD")]
    InvalidDatestamp { value: String },

    /// A calendar field outside the 360-day calendar.
    #[error("invalid 360-day calendar time: {reason}")]
    InvalidTime { reason: String },

    /// A state directory name that is not one of the four lifecycle states.
    #[error("unknown version state '{0}'")]
    UnknownState(String),

    /// A request descriptor that parsed but is not usable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
