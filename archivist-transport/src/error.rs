//! Error types for archivist-transport.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure class reported by the archive client through its exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    User,
    System,
    Client,
    Access,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::User => "user error",
            FailureKind::System => "system error",
            FailureKind::Client => "client error",
            FailureKind::Access => "access error",
        };
        f.write_str(s)
    }
}

/// All errors that can arise from archive operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The archive client could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive path does not exist: {path}")]
    NotFound { path: String },

    #[error("archive path already exists: {path}")]
    AlreadyExists { path: String },

    #[error("archive directory is not empty: {path}")]
    NotEmpty { path: String },

    /// A classified failure of an archive command.
    #[error("{kind} running `{command}`: {detail}")]
    Command {
        kind: FailureKind,
        command: String,
        detail: String,
    },

    /// Any other non-zero exit.
    #[error("`{command}` failed ({status}): {detail}")]
    Failed {
        command: String,
        status: String,
        detail: String,
    },
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound { .. })
    }
}
