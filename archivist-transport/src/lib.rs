//! Access to the remote archive.
//!
//! Planning and emission code only ever sees [`ArchiveTransport`]. The
//! production implementation shells out to `moo`; [`MemoryTransport`] keeps
//! the archive in memory and records every call.

pub mod error;
pub mod memory;
pub mod moo;

use std::path::PathBuf;

pub use error::{FailureKind, TransportError};
pub use memory::{CallKind, MemoryTransport, TransportCall};
pub use moo::MooTransport;

/// Operations the archive must support.
///
/// Archive paths are slash-separated strings such as
/// `moose:/adhoc/projects/cdds/ap5/Amon/tas/available/v20240315`.
pub trait ArchiveTransport {
    /// Recursive long listing below `path`, one `<type-flag> ... <path>` line
    /// per record. A path that does not exist lists as empty.
    fn list(&self, path: &str) -> Result<Vec<String>, TransportError>;

    fn exists(&self, path: &str) -> Result<bool, TransportError>;

    /// Create `path` and any missing parents. Existing directories are fine.
    fn make_dir(&self, path: &str) -> Result<(), TransportError>;

    /// Upload local files into the existing directory `remote_dir`.
    fn put(&self, files: &[PathBuf], remote_dir: &str) -> Result<(), TransportError>;

    /// Move archived files into the existing directory `remote_dir`.
    fn move_files(&self, sources: &[String], remote_dir: &str) -> Result<(), TransportError>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &str) -> Result<(), TransportError>;
}

impl<T: ArchiveTransport + ?Sized> ArchiveTransport for &T {
    fn list(&self, path: &str) -> Result<Vec<String>, TransportError> {
        (**self).list(path)
    }

    fn exists(&self, path: &str) -> Result<bool, TransportError> {
        (**self).exists(path)
    }

    fn make_dir(&self, path: &str) -> Result<(), TransportError> {
        (**self).make_dir(path)
    }

    fn put(&self, files: &[PathBuf], remote_dir: &str) -> Result<(), TransportError> {
        (**self).put(files, remote_dir)
    }

    fn move_files(&self, sources: &[String], remote_dir: &str) -> Result<(), TransportError> {
        (**self).move_files(sources, remote_dir)
    }

    fn remove_dir(&self, path: &str) -> Result<(), TransportError> {
        (**self).remove_dir(path)
    }
}

impl<T: ArchiveTransport + ?Sized> ArchiveTransport for Box<T> {
    fn list(&self, path: &str) -> Result<Vec<String>, TransportError> {
        (**self).list(path)
    }

    fn exists(&self, path: &str) -> Result<bool, TransportError> {
        (**self).exists(path)
    }

    fn make_dir(&self, path: &str) -> Result<(), TransportError> {
        (**self).make_dir(path)
    }

    fn put(&self, files: &[PathBuf], remote_dir: &str) -> Result<(), TransportError> {
        (**self).put(files, remote_dir)
    }

    fn move_files(&self, sources: &[String], remote_dir: &str) -> Result<(), TransportError> {
        (**self).move_files(sources, remote_dir)
    }

    fn remove_dir(&self, path: &str) -> Result<(), TransportError> {
        (**self).remove_dir(path)
    }
}
