//! Archive operations for a publication plan.
//!
//! [`emit`] turns a valid [`PublicationPlan`] into an ordered list of
//! [`TransportOp`]s and [`execute`] issues them. New files are always stored
//! before anything is retired, and retired data files move into the new
//! version rather than out of the valid states, so every previously published
//! range stays held by an available or embargoed version:
//!
//! 1. `MakeDir` the target `embargoed/<datestamp>` directory.
//! 2. `Put` the local files not yet stored there.
//! 3. For appending/prepending against an available version:
//!    `MakeDir` `superseded/<old>` and `PutManifest` into it, `Move` the old
//!    data files into the target directory, then `RemoveDir` the emptied
//!    `available/<old>`.
//!
//! Every `MakeDir` and `PutManifest` is preceded by an existence probe at
//! execution time, which makes re-running an interrupted publication safe.

use std::path::PathBuf;

use serde::Serialize;

use archivist_core::{can_transition, VariableId, VersionState};
use archivist_transport::ArchiveTransport;

use crate::error::{io_err, PublishError};
use crate::inventory::version_dir;
use crate::planner::{PublicationMode, PublicationPlan, PublicationVersion};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// One mutation of the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransportOp {
    MakeDir {
        path: String,
    },
    Put {
        files: Vec<PathBuf>,
        dest: String,
    },
    /// Upload a generated text file named `name` into `dest`.
    PutManifest {
        name: String,
        contents: String,
        dest: String,
    },
    Move {
        sources: Vec<String>,
        dest: String,
    },
    RemoveDir {
        path: String,
    },
}

impl TransportOp {
    /// Short human-readable form used in logs and reports.
    pub fn summary(&self) -> String {
        match self {
            TransportOp::MakeDir { path } => format!("mkdir {path}"),
            TransportOp::Put { files, dest } => format!("put {} file(s) -> {dest}", files.len()),
            TransportOp::PutManifest { name, dest, .. } => format!("put {name} -> {dest}"),
            TransportOp::Move { sources, dest } => {
                format!("mv {} file(s) -> {dest}", sources.len())
            }
            TransportOp::RemoveDir { path } => format!("rmdir {path}"),
        }
    }
}

/// Name of the manifest written alongside retired files.
pub fn manifest_name(variable: &VariableId) -> String {
    format!("{}_{}_superseded.log", variable.table, variable.name)
}

// ---------------------------------------------------------------------------
// emit
// ---------------------------------------------------------------------------

/// Operations that carry out `plan` for the files in `local_files`.
///
/// Fails with [`PublishError::InvalidMode`] for a blocked plan, so nothing
/// is ever emitted for one.
pub fn emit(
    plan: &PublicationPlan,
    variable: &VariableId,
    variable_root: &str,
    local_files: &[PathBuf],
) -> Result<Vec<TransportOp>, PublishError> {
    if !plan.mode.valid() {
        return Err(PublishError::InvalidMode {
            variable: variable.to_string(),
            mode: plan.mode,
        });
    }

    let target = version_dir(variable_root, VersionState::Embargoed, &plan.target);
    let mut ops = vec![TransportOp::MakeDir {
        path: target.clone(),
    }];

    let pending: Vec<PathBuf> = local_files
        .iter()
        .filter(|f| {
            let name = f.file_name().map(|n| n.to_string_lossy());
            !name.is_some_and(|n| plan.stored.iter().any(|s| *s == n))
        })
        .cloned()
        .collect();
    if pending.is_empty() {
        tracing::info!("{variable}: all files already stored under {target}");
    } else {
        ops.push(TransportOp::Put {
            files: pending,
            dest: target.clone(),
        });
    }

    if let Some(predecessor) = &plan.predecessor {
        retire(&mut ops, plan, predecessor, variable, variable_root, &target)?;
    }

    Ok(ops)
}

fn retire(
    ops: &mut Vec<TransportOp>,
    plan: &PublicationPlan,
    predecessor: &PublicationVersion,
    variable: &VariableId,
    variable_root: &str,
    target: &str,
) -> Result<(), PublishError> {
    let to = VersionState::Superseded;
    if !plan.mode.retires_predecessor() || !can_transition(predecessor.state, to) {
        return Err(PublishError::IllegalTransition {
            from: predecessor.state,
            to,
        });
    }

    let superseded = version_dir(variable_root, to, &predecessor.datestamp);
    let verb = match plan.mode {
        PublicationMode::Prepending => "prepended to",
        _ => "appended to",
    };
    let contents = format!(
        "The following files of {variable} were superseded when data was {verb} \
         this dataset under {}:\n\
         Files moved:\n{}\n\
         New location:\n{target}\n",
        plan.target,
        predecessor.files.join("\n"),
    );

    ops.push(TransportOp::MakeDir {
        path: superseded.clone(),
    });
    ops.push(TransportOp::PutManifest {
        name: manifest_name(variable),
        contents,
        dest: superseded,
    });
    ops.push(TransportOp::Move {
        sources: predecessor.files.clone(),
        dest: target.to_owned(),
    });
    ops.push(TransportOp::RemoveDir {
        path: version_dir(variable_root, predecessor.state, &predecessor.datestamp),
    });
    Ok(())
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

/// Outcome of one issued operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    /// The operation was issued against the archive.
    Applied { op: TransportOp },
    /// The existence probe found the target already present.
    AlreadyPresent { op: TransportOp },
    /// Simulation mode: the operation *would* have been issued.
    Simulated { op: TransportOp },
}

impl OpOutcome {
    pub fn op(&self) -> &TransportOp {
        match self {
            OpOutcome::Applied { op }
            | OpOutcome::AlreadyPresent { op }
            | OpOutcome::Simulated { op } => op,
        }
    }
}

/// Issue `ops` in order, stopping at the first failure.
///
/// With `simulate` set, every operation is logged and nothing (not even an
/// existence probe) reaches the transport.
pub fn execute<T: ArchiveTransport + ?Sized>(
    transport: &T,
    ops: Vec<TransportOp>,
    simulate: bool,
) -> Result<Vec<OpOutcome>, PublishError> {
    let mut outcomes = Vec::with_capacity(ops.len());
    for op in ops {
        if simulate {
            tracing::info!("[simulate] {}", op.summary());
            outcomes.push(OpOutcome::Simulated { op });
            continue;
        }
        outcomes.push(apply(transport, op)?);
    }
    Ok(outcomes)
}

fn apply<T: ArchiveTransport + ?Sized>(
    transport: &T,
    op: TransportOp,
) -> Result<OpOutcome, PublishError> {
    match &op {
        TransportOp::MakeDir { path } => {
            if transport.exists(path)? {
                tracing::debug!("directory {path} already exists");
                return Ok(OpOutcome::AlreadyPresent { op });
            }
            transport.make_dir(path)?;
        }
        TransportOp::Put { files, dest } => transport.put(files, dest)?,
        TransportOp::PutManifest {
            name,
            contents,
            dest,
        } => {
            if transport.exists(&format!("{dest}/{name}"))? {
                tracing::debug!("manifest {dest}/{name} already stored");
                return Ok(OpOutcome::AlreadyPresent { op });
            }
            let scratch = tempfile::tempdir().map_err(|e| io_err(std::env::temp_dir(), e))?;
            let local = scratch.path().join(name);
            std::fs::write(&local, contents).map_err(|e| io_err(&local, e))?;
            transport.put(&[local], dest)?;
        }
        TransportOp::Move { sources, dest } => transport.move_files(sources, dest)?,
        TransportOp::RemoveDir { path } => transport.remove_dir(path)?,
    }
    tracing::info!("{}", op.summary());
    Ok(OpOutcome::Applied { op })
}
