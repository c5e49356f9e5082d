//! Publication planning.
//!
//! [`plan`] is a pure function of a [`PublicationRequest`]: it compares the
//! local coverage against the versions already in the archive and decides
//! how (or whether) the new files may be published.
//!
//! Rule precedence:
//! 1. `FirstPublication` (nothing stored for the variable at all)
//! 2. `DatestampReuse` (the new datestamp names a non-embargoed version)
//! 3. `MultipleEmbargoed` (more than one embargoed datestamp)
//! 4. `AlreadyPublished` (two overlapping available versions)
//! 5. Single-version relations against the live versions
//! 6. `Unknown`
//!
//! Superseded versions are history. They count for rules 1 and 2 only.

use std::fmt;

use serde::Serialize;

use archivist_core::{DateRange, Datestamp, VariableId, VersionState};

// ---------------------------------------------------------------------------
// Publication mode
// ---------------------------------------------------------------------------

/// How a batch of files relates to what is already archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationMode {
    FirstPublication,
    Appending,
    Prepending,
    ProcessingContinuation,
    PreviouslyWithdrawn,
    AlreadyPublished,
    PartiallyPublished,
    DatestampReuse,
    MultipleEmbargoed,
    Unknown,
}

impl PublicationMode {
    pub const ALL: [PublicationMode; 10] = [
        PublicationMode::FirstPublication,
        PublicationMode::Appending,
        PublicationMode::Prepending,
        PublicationMode::ProcessingContinuation,
        PublicationMode::PreviouslyWithdrawn,
        PublicationMode::AlreadyPublished,
        PublicationMode::PartiallyPublished,
        PublicationMode::DatestampReuse,
        PublicationMode::MultipleEmbargoed,
        PublicationMode::Unknown,
    ];

    /// Whether files may be published in this mode.
    pub fn valid(self) -> bool {
        matches!(
            self,
            PublicationMode::FirstPublication
                | PublicationMode::Appending
                | PublicationMode::Prepending
                | PublicationMode::ProcessingContinuation
                | PublicationMode::PreviouslyWithdrawn
        )
    }

    /// Whether publishing in this mode retires an available predecessor.
    pub fn retires_predecessor(self) -> bool {
        matches!(self, PublicationMode::Appending | PublicationMode::Prepending)
    }

    pub fn label(self) -> &'static str {
        match self {
            PublicationMode::FirstPublication => "FIRST_PUBLICATION",
            PublicationMode::Appending => "APPENDING",
            PublicationMode::Prepending => "PREPENDING",
            PublicationMode::ProcessingContinuation => "PROCESSING_CONTINUATION",
            PublicationMode::PreviouslyWithdrawn => "PREVIOUSLY_WITHDRAWN",
            PublicationMode::AlreadyPublished => "ALREADY_PUBLISHED",
            PublicationMode::PartiallyPublished => "PARTIALLY_PUBLISHED",
            PublicationMode::DatestampReuse => "DATESTAMP_REUSE",
            PublicationMode::MultipleEmbargoed => "MULTIPLE_EMBARGOED",
            PublicationMode::Unknown => "UNKNOWN",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PublicationMode::FirstPublication => "first publication",
            PublicationMode::Appending => "append (in time) to already published data",
            PublicationMode::Prepending => "prepend (in time) to already published data",
            PublicationMode::ProcessingContinuation => "continue an interrupted publication",
            PublicationMode::PreviouslyWithdrawn => {
                "publish data for a variable that was previously withdrawn"
            }
            PublicationMode::AlreadyPublished => {
                "the time period is already published in the available state"
            }
            PublicationMode::PartiallyPublished => {
                "part of the time period is already published in the available state"
            }
            PublicationMode::DatestampReuse => "the datestamp was used by an earlier version",
            PublicationMode::MultipleEmbargoed => {
                "more than one embargoed version exists with different datestamps"
            }
            PublicationMode::Unknown => "unrecognised archive state",
        }
    }
}

impl fmt::Display for PublicationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Request and plan
// ---------------------------------------------------------------------------

/// One archived copy of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationVersion {
    pub datestamp: Datestamp,
    pub range: DateRange,
    pub state: VersionState,
    /// Full archive paths of the version's files.
    pub files: Vec<String>,
}

impl PublicationVersion {
    /// Final path segments of [`PublicationVersion::files`].
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|f| f.rsplit('/').next().unwrap_or(f).to_owned())
            .collect()
    }
}

/// Everything the planner needs to decide on one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationRequest {
    pub variable: VariableId,
    pub local_range: DateRange,
    /// Names of the local files covering `local_range`.
    pub local_files: Vec<String>,
    pub versions: Vec<PublicationVersion>,
    /// Datestamp a fresh publication would use.
    pub new_datestamp: Datestamp,
    /// Allow appending to a withdrawn version.
    pub republish_withdrawn: bool,
}

/// Decision for one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationPlan {
    pub mode: PublicationMode,
    /// Datestamp the files are written under.
    pub target: Datestamp,
    /// Available version whose files move under `target` once the new files
    /// are stored.
    pub predecessor: Option<PublicationVersion>,
    /// Names of files already stored under `target`.
    pub stored: Vec<String>,
}

impl PublicationPlan {
    fn fresh(mode: PublicationMode, request: &PublicationRequest) -> Self {
        Self {
            mode,
            target: request.new_datestamp.clone(),
            predecessor: None,
            stored: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

/// Decide how `request` may be published.
pub fn plan(request: &PublicationRequest) -> PublicationPlan {
    let decision = decide(request);
    tracing::debug!(
        "{}: {} under {}",
        request.variable,
        decision.mode,
        decision.target
    );
    decision
}

fn decide(request: &PublicationRequest) -> PublicationPlan {
    let local = &request.local_range;
    let blocked = |mode| PublicationPlan::fresh(mode, request);

    if request.versions.is_empty() {
        return PublicationPlan::fresh(PublicationMode::FirstPublication, request);
    }

    if request
        .versions
        .iter()
        .any(|v| v.state != VersionState::Embargoed && v.datestamp == request.new_datestamp)
    {
        return blocked(PublicationMode::DatestampReuse);
    }

    let in_state = |state: VersionState| -> Vec<&PublicationVersion> {
        request.versions.iter().filter(|v| v.state == state).collect()
    };
    let embargoed = in_state(VersionState::Embargoed);
    let available = in_state(VersionState::Available);
    let withdrawn = in_state(VersionState::Withdrawn);

    if embargoed.len() > 1 {
        return blocked(PublicationMode::MultipleEmbargoed);
    }

    if available.len() > 1 {
        let overlapping = available.iter().enumerate().any(|(i, a)| {
            available[i + 1..]
                .iter()
                .any(|b| a.range.overlaps(&b.range))
        });
        return blocked(if overlapping {
            PublicationMode::AlreadyPublished
        } else {
            PublicationMode::Unknown
        });
    }

    if withdrawn.len() > 1 || (!available.is_empty() && !withdrawn.is_empty()) {
        return blocked(PublicationMode::Unknown);
    }

    let resumable = embargoed.first().copied();

    match (available.first().copied(), withdrawn.first().copied()) {
        (Some(predecessor), None) => {
            let mode = relation_to_available(&predecessor.range, local);
            if !mode.retires_predecessor() {
                return blocked(mode);
            }
            extend(request, mode, Some(predecessor), resumable)
        }
        (None, Some(previous)) => {
            let mode = relation_to_withdrawn(&previous.range, local, request.republish_withdrawn);
            if !mode.valid() {
                return blocked(mode);
            }
            extend(request, mode, None, resumable)
        }
        (None, None) => match resumable {
            Some(embargoed)
                if is_resumable(&embargoed.range, local) || holds_all_local(embargoed, request) =>
            {
                PublicationPlan {
                    mode: PublicationMode::ProcessingContinuation,
                    target: embargoed.datestamp.clone(),
                    predecessor: None,
                    stored: embargoed.file_names(),
                }
            }
            _ => blocked(PublicationMode::Unknown),
        },
        (Some(_), Some(_)) => blocked(PublicationMode::Unknown),
    }
}

/// Same start, and no longer than the local range: an interrupted attempt at
/// storing a subset of today's files.
fn is_resumable(stored: &DateRange, local: &DateRange) -> bool {
    stored.start == local.start && local.contains_range(stored)
}

/// The embargoed version already holds every local file and covers the local
/// range: an append or prepend whose predecessor files were moved in before
/// the run stopped.
fn holds_all_local(embargoed: &PublicationVersion, request: &PublicationRequest) -> bool {
    if request.local_files.is_empty() || !embargoed.range.contains_range(&request.local_range) {
        return false;
    }
    let stored = embargoed.file_names();
    request.local_files.iter().all(|f| stored.contains(f))
}

fn relation_to_available(existing: &DateRange, local: &DateRange) -> PublicationMode {
    if existing.contains_range(local) {
        PublicationMode::AlreadyPublished
    } else if existing.is_followed_by(local) {
        PublicationMode::Appending
    } else if local.is_followed_by(existing) {
        PublicationMode::Prepending
    } else if existing.overlaps(local) {
        PublicationMode::PartiallyPublished
    } else {
        PublicationMode::Unknown
    }
}

fn relation_to_withdrawn(
    existing: &DateRange,
    local: &DateRange,
    republish_withdrawn: bool,
) -> PublicationMode {
    if existing.is_followed_by(local) {
        if republish_withdrawn {
            PublicationMode::Appending
        } else {
            PublicationMode::PreviouslyWithdrawn
        }
    } else if existing.contains_range(local) {
        PublicationMode::PreviouslyWithdrawn
    } else {
        PublicationMode::Unknown
    }
}

/// Publish alongside an existing version, resuming an interrupted attempt if
/// one is embargoed.
fn extend(
    request: &PublicationRequest,
    mode: PublicationMode,
    predecessor: Option<&PublicationVersion>,
    resumable: Option<&PublicationVersion>,
) -> PublicationPlan {
    let predecessor = predecessor.cloned();
    match resumable {
        None => PublicationPlan {
            mode,
            target: request.new_datestamp.clone(),
            predecessor,
            stored: Vec::new(),
        },
        Some(embargoed)
            if is_resumable(&embargoed.range, &request.local_range)
                || holds_all_local(embargoed, request) =>
        {
            PublicationPlan {
                mode,
                target: embargoed.datestamp.clone(),
                predecessor,
                stored: embargoed.file_names(),
            }
        }
        Some(_) => PublicationPlan::fresh(PublicationMode::Unknown, request),
    }
}
