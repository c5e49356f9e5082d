//! [`ArchiveTransport`] over the `moo` command-line client.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{FailureKind, TransportError};
use crate::ArchiveTransport;

/// Marker the client prints on stderr when the target path is absent.
const FILE_DOES_NOT_EXIST: &str = "TSSC_FILE_DOES_NOT_EXIST";

/// Runs `moo` subcommands as child processes.
#[derive(Debug, Clone)]
pub struct MooTransport {
    program: PathBuf,
}

impl Default for MooTransport {
    fn default() -> Self {
        Self::new("moo")
    }
}

impl MooTransport {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `moo <args>` and return its stdout. `subject` is the archive path
    /// the command is about, used in not-found and already-exists errors.
    fn run(&self, args: &[String], subject: &str) -> Result<String, TransportError> {
        let command = format!("{} {}", self.program.display(), args.join(" "));
        tracing::debug!("running {command}");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| TransportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if output.status.success() {
            tracing::debug!("{command} output:\n{stdout}");
            return Ok(stdout);
        }
        Err(classify(
            &command,
            subject,
            output.status.code(),
            &output.status.to_string(),
            &stderr,
        ))
    }
}

/// Map a failed client exit status onto a [`TransportError`].
pub(crate) fn classify(
    command: &str,
    subject: &str,
    code: Option<i32>,
    status: &str,
    stderr: &str,
) -> TransportError {
    let classified = |kind| TransportError::Command {
        kind,
        command: command.to_owned(),
        detail: stderr.to_owned(),
    };
    match code {
        Some(2) if stderr.contains(FILE_DOES_NOT_EXIST) => TransportError::NotFound {
            path: subject.to_owned(),
        },
        Some(2) => classified(FailureKind::User),
        Some(3) => classified(FailureKind::System),
        Some(4) => classified(FailureKind::Client),
        Some(5) => classified(FailureKind::Access),
        Some(10) => TransportError::AlreadyExists {
            path: subject.to_owned(),
        },
        _ => TransportError::Failed {
            command: command.to_owned(),
            status: status.to_owned(),
            detail: stderr.to_owned(),
        },
    }
}

fn args<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}

impl ArchiveTransport for MooTransport {
    fn list(&self, path: &str) -> Result<Vec<String>, TransportError> {
        match self.run(&args(["ls", "-Rl", path]), path) {
            Ok(stdout) => Ok(stdout
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_owned)
                .collect()),
            Err(e) if e.is_not_found() => {
                tracing::debug!("archive path {path} does not exist");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn exists(&self, path: &str) -> Result<bool, TransportError> {
        match self.run(&args(["test", path]), path) {
            Ok(stdout) => Ok(stdout.to_lowercase().contains("true")),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn make_dir(&self, path: &str) -> Result<(), TransportError> {
        match self.run(&args(["mkdir", "-p", path]), path) {
            Ok(_) => Ok(()),
            Err(TransportError::AlreadyExists { .. }) => {
                tracing::debug!("archive directory {path} already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn put(&self, files: &[PathBuf], remote_dir: &str) -> Result<(), TransportError> {
        let mut cmd = args(["put"]);
        cmd.extend(files.iter().map(|f| f.display().to_string()));
        cmd.push(remote_dir.to_owned());
        self.run(&cmd, remote_dir).map(drop)
    }

    fn move_files(&self, sources: &[String], remote_dir: &str) -> Result<(), TransportError> {
        let mut cmd = args(["mv"]);
        cmd.extend(sources.iter().cloned());
        cmd.push(remote_dir.to_owned());
        self.run(&cmd, remote_dir).map(drop)
    }

    fn remove_dir(&self, path: &str) -> Result<(), TransportError> {
        self.run(&args(["rmdir", path]), path).map(drop)
    }
}
