//! In-memory archive with a call log.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{FailureKind, TransportError};
use crate::ArchiveTransport;

/// One call made against a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    List(String),
    Exists(String),
    MakeDir(String),
    Put { files: Vec<String>, dest: String },
    Move { sources: Vec<String>, dest: String },
    RemoveDir(String),
}

/// Operation kind, for counting calls and injecting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    List,
    Exists,
    MakeDir,
    Put,
    Move,
    RemoveDir,
}

impl TransportCall {
    pub fn kind(&self) -> CallKind {
        match self {
            TransportCall::List(_) => CallKind::List,
            TransportCall::Exists(_) => CallKind::Exists,
            TransportCall::MakeDir(_) => CallKind::MakeDir,
            TransportCall::Put { .. } => CallKind::Put,
            TransportCall::Move { .. } => CallKind::Move,
            TransportCall::RemoveDir(_) => CallKind::RemoveDir,
        }
    }
}

#[derive(Debug, Default)]
struct ArchiveState {
    dirs: BTreeSet<String>,
    /// File path to size in bytes.
    files: BTreeMap<String, u64>,
    calls: Vec<TransportCall>,
    failures: Vec<CallKind>,
}

impl ArchiveState {
    fn exists(&self, path: &str) -> bool {
        self.dirs.contains(path) || self.files.contains_key(path)
    }

    fn has_children(&self, path: &str) -> bool {
        let prefix = format!("{path}/");
        self.dirs.iter().any(|d| d.starts_with(&prefix))
            || self.files.keys().any(|f| f.starts_with(&prefix))
    }

    fn require_dir(&self, path: &str) -> Result<(), TransportError> {
        if self.dirs.contains(path) {
            Ok(())
        } else {
            Err(TransportError::NotFound {
                path: path.to_owned(),
            })
        }
    }

    fn make_dirs(&mut self, path: &str) {
        let mut current = path.trim_end_matches('/');
        while current.contains('/') && !current.ends_with(':') {
            self.dirs.insert(current.to_owned());
            match current.rfind('/') {
                Some(idx) => current = &current[..idx],
                None => break,
            }
        }
    }

    /// Record `call`, failing it if a failure was queued for its kind.
    fn record(&mut self, call: TransportCall) -> Result<(), TransportError> {
        let kind = call.kind();
        let command = format!("{call:?}");
        self.calls.push(call);
        if let Some(idx) = self.failures.iter().position(|k| *k == kind) {
            self.failures.remove(idx);
            return Err(TransportError::Command {
                kind: FailureKind::System,
                command,
                detail: "injected failure".into(),
            });
        }
        Ok(())
    }
}

/// An archive held in memory.
///
/// Listings use the long format of the real client:
/// `<flag> <owner> <group> <links> <size> <date> <time> <zone> <path>`.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Mutex<ArchiveState>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ArchiveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a directory (and parents) without recording a call.
    pub fn seed_dir(&self, path: &str) {
        self.state().make_dirs(path);
    }

    /// Create a file (and its parent directories) without recording a call.
    pub fn seed_file(&self, path: &str, size: u64) {
        let mut state = self.state();
        if let Some(idx) = path.rfind('/') {
            state.make_dirs(&path[..idx]);
        }
        state.files.insert(path.to_owned(), size);
    }

    /// Make the next call of `kind` fail with a system error.
    pub fn fail_next(&self, kind: CallKind) {
        self.state().failures.push(kind);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.state().calls.iter().filter(|c| c.kind() == kind).count()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.state().dirs.contains(path)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.state().files.contains_key(path)
    }

    /// Names of the files directly inside `dir`.
    pub fn file_names(&self, dir: &str) -> Vec<String> {
        let prefix = format!("{dir}/");
        self.state()
            .files
            .keys()
            .filter_map(|f| f.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_owned)
            .collect()
    }
}

fn listing_line(flag: &str, size: u64, path: &str) -> String {
    format!("{flag} archivist moose 1 {size} 2024-01-01 00:00:00 GMT {path}")
}

impl ArchiveTransport for MemoryTransport {
    fn list(&self, path: &str) -> Result<Vec<String>, TransportError> {
        let mut state = self.state();
        state.record(TransportCall::List(path.to_owned()))?;

        let prefix = format!("{path}/");
        let under = |p: &str| p == path || p.starts_with(&prefix);
        let mut lines: Vec<(String, String)> = state
            .dirs
            .iter()
            .filter(|d| under(d))
            .map(|d| (d.clone(), listing_line("D", 0, d)))
            .collect();
        lines.extend(
            state
                .files
                .iter()
                .filter(|(f, _)| under(f))
                .map(|(f, size)| (f.clone(), listing_line("F", *size, f))),
        );
        lines.sort();
        Ok(lines.into_iter().map(|(_, line)| line).collect())
    }

    fn exists(&self, path: &str) -> Result<bool, TransportError> {
        let mut state = self.state();
        state.record(TransportCall::Exists(path.to_owned()))?;
        Ok(state.exists(path))
    }

    fn make_dir(&self, path: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.record(TransportCall::MakeDir(path.to_owned()))?;
        if state.files.contains_key(path) {
            return Err(TransportError::AlreadyExists {
                path: path.to_owned(),
            });
        }
        state.make_dirs(path);
        Ok(())
    }

    fn put(&self, files: &[PathBuf], remote_dir: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.record(TransportCall::Put {
            files: files.iter().map(|f| f.display().to_string()).collect(),
            dest: remote_dir.to_owned(),
        })?;
        state.require_dir(remote_dir)?;

        let mut targets = Vec::with_capacity(files.len());
        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let target = format!("{remote_dir}/{name}");
            if state.exists(&target) {
                return Err(TransportError::AlreadyExists { path: target });
            }
            let size = std::fs::metadata(file).map(|m| m.len()).unwrap_or(0);
            targets.push((target, size));
        }
        state.files.extend(targets);
        Ok(())
    }

    fn move_files(&self, sources: &[String], remote_dir: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.record(TransportCall::Move {
            sources: sources.to_vec(),
            dest: remote_dir.to_owned(),
        })?;
        state.require_dir(remote_dir)?;

        for source in sources {
            if !state.files.contains_key(source) {
                return Err(TransportError::NotFound {
                    path: source.clone(),
                });
            }
        }
        for source in sources {
            let name = source.rsplit('/').next().unwrap_or(source);
            let target = format!("{remote_dir}/{name}");
            if let Some(size) = state.files.remove(source) {
                state.files.insert(target, size);
            }
        }
        Ok(())
    }

    fn remove_dir(&self, path: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.record(TransportCall::RemoveDir(path.to_owned()))?;
        state.require_dir(path)?;
        if state.has_children(path) {
            return Err(TransportError::NotEmpty {
                path: path.to_owned(),
            });
        }
        state.dirs.remove(path);
        Ok(())
    }
}
