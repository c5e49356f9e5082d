//! Batch publication entrypoint used by the CLI.
//!
//! Variables are processed one after another against a single fresh listing
//! of the archive root. A variable that is blocked or fails does not stop the
//! batch; its outcome is recorded in the [`BatchSummary`].

use std::path::{Path, PathBuf};

use archivist_core::{ArchiveTree, Datestamp, RequestDescriptor, VariableEntry, VariableId};
use archivist_dates::{DateRangeCalculator, Frequency};
use archivist_transport::ArchiveTransport;

use crate::cleanup;
use crate::emitter::{emit, execute, OpOutcome};
use crate::error::{io_err, PublishError};
use crate::inventory::stored_versions;
use crate::planner::{plan, PublicationMode, PublicationPlan, PublicationRequest};

/// Options for a batch run.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Log operations instead of issuing them.
    pub simulate: bool,
    /// Skip the empty-directory cleanup that precedes planning.
    pub skip_cleanup: bool,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of publishing one variable.
#[derive(Debug)]
pub enum VariableOutcome {
    Published {
        plan: PublicationPlan,
        outcomes: Vec<OpOutcome>,
    },
    /// The planner refused the publication.
    Blocked { mode: PublicationMode },
    /// An unexpected error (listing, local files, transport).
    Failed { error: PublishError },
}

#[derive(Debug)]
pub struct VariableReport {
    pub variable: VariableId,
    pub outcome: VariableOutcome,
}

/// Per-variable outcomes of one batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<VariableReport>,
    /// Empty directories removed (or, when simulating, found) before planning.
    pub cleaned: Vec<String>,
}

impl BatchSummary {
    pub fn published(&self) -> usize {
        self.count(|o| matches!(o, VariableOutcome::Published { .. }))
    }

    pub fn blocked(&self) -> usize {
        self.count(|o| matches!(o, VariableOutcome::Blocked { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, VariableOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&VariableOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Planner input and decision for one variable, without any side effects.
#[derive(Debug)]
pub struct Assessment {
    pub request: PublicationRequest,
    pub plan: PublicationPlan,
    pub local_files: Vec<PathBuf>,
    pub variable_root: String,
}

// ---------------------------------------------------------------------------
// Preparation
// ---------------------------------------------------------------------------

/// Data files in `dir` whose names match the calculator's pattern, sorted.
pub fn local_files(
    dir: &Path,
    calculator: &DateRangeCalculator,
) -> Result<Vec<PathBuf>, PublishError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .is_some_and(|n| calculator.pattern().is_match(&n.to_string_lossy()));
        if matches {
            files.push(path);
        } else {
            tracing::warn!("skipping non-data file {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}

/// Build the planner input for `entry` and decide on it.
pub fn assess(
    tree: &ArchiveTree,
    request: &RequestDescriptor,
    entry: &VariableEntry,
    new_datestamp: &Datestamp,
    calculator: &DateRangeCalculator,
) -> Result<Assessment, PublishError> {
    let frequency: Frequency = entry.frequency.parse()?;
    let files = local_files(&entry.output_dir, calculator)?;
    let paths: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
    let local_range = calculator.date_range(&paths, frequency)?;
    let local_names = files
        .iter()
        .filter_map(|f| f.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();

    let variable_root = request.variable_root(&entry.id);
    let versions = stored_versions(tree, &variable_root, frequency, calculator)?;

    let publication = PublicationRequest {
        variable: entry.id.clone(),
        local_range,
        local_files: local_names,
        versions,
        new_datestamp: new_datestamp.clone(),
        republish_withdrawn: entry.republish_withdrawn,
    };
    let decision = plan(&publication);
    Ok(Assessment {
        request: publication,
        plan: decision,
        local_files: files,
        variable_root,
    })
}

/// Assess every variable of `request` against one fresh listing.
pub fn assess_all<T: ArchiveTransport + ?Sized>(
    transport: &T,
    request: &RequestDescriptor,
    calculator: &DateRangeCalculator,
) -> Result<Vec<(VariableId, Result<Assessment, PublishError>)>, PublishError> {
    let tree = fetch_tree(transport, request)?;
    let datestamp = request.datestamp();
    Ok(request
        .variables
        .iter()
        .map(|entry| {
            let assessment = assess(&tree, request, entry, &datestamp, calculator);
            (entry.id.clone(), assessment)
        })
        .collect())
}

fn fetch_tree<T: ArchiveTransport + ?Sized>(
    transport: &T,
    request: &RequestDescriptor,
) -> Result<ArchiveTree, PublishError> {
    let listing = transport.list(&request.archive_root)?;
    tracing::debug!(
        "listed {} record(s) below {}",
        listing.len(),
        request.archive_root
    );
    Ok(ArchiveTree::from_listing(&listing))
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Publish every variable of `request`.
///
/// Errors are returned only when the batch cannot start (cleanup or the
/// archive listing fails); per-variable problems end up in the summary.
pub fn run<T: ArchiveTransport + ?Sized>(
    transport: &T,
    request: &RequestDescriptor,
    calculator: &DateRangeCalculator,
    options: &PublishOptions,
) -> Result<BatchSummary, PublishError> {
    let mut summary = BatchSummary::default();
    if !options.skip_cleanup {
        summary.cleaned = cleanup::clean(transport, request, options.simulate)?;
    }

    let tree = fetch_tree(transport, request)?;
    let datestamp = request.datestamp();
    tracing::info!(
        "publishing {} variable(s) under {datestamp}",
        request.variables.len()
    );

    for entry in &request.variables {
        tracing::info!("processing variable {}", entry.id);
        let published = publish_variable(
            transport, &tree, request, entry, &datestamp, calculator, options,
        );
        let outcome = match published {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!("{}: {error}", entry.id);
                VariableOutcome::Failed { error }
            }
        };
        summary.reports.push(VariableReport {
            variable: entry.id.clone(),
            outcome,
        });
    }

    tracing::info!(
        "{} published, {} blocked, {} failed",
        summary.published(),
        summary.blocked(),
        summary.failed()
    );
    Ok(summary)
}

fn publish_variable<T: ArchiveTransport + ?Sized>(
    transport: &T,
    tree: &ArchiveTree,
    request: &RequestDescriptor,
    entry: &VariableEntry,
    datestamp: &Datestamp,
    calculator: &DateRangeCalculator,
    options: &PublishOptions,
) -> Result<VariableOutcome, PublishError> {
    let assessment = assess(tree, request, entry, datestamp, calculator)?;
    let mode = assessment.plan.mode;

    if !mode.valid() {
        tracing::error!("{}: cannot publish: {}", entry.id, mode.description());
        return Ok(VariableOutcome::Blocked { mode });
    }
    tracing::info!(
        "{}: {} ({}) covering {}",
        entry.id,
        mode,
        mode.description(),
        assessment.request.local_range
    );

    let ops = emit(
        &assessment.plan,
        &entry.id,
        &assessment.variable_root,
        &assessment.local_files,
    )?;
    let outcomes = execute(transport, ops, options.simulate)?;
    Ok(VariableOutcome::Published {
        plan: assessment.plan,
        outcomes,
    })
}
