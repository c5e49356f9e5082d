//! Archivist core library: domain types, lifecycle, calendar, archive tree.
//!
//! - [`types`]: newtypes, [`VariableId`], [`Datestamp`]
//! - [`state`]: [`VersionState`] and its transition table
//! - [`calendar`]: 360-day [`Datetime360`] and half-open [`DateRange`]
//! - [`tree`]: [`ArchiveTree`] built from a recursive listing
//! - [`request`]: YAML request descriptor loading
//! - [`error`]: [`CoreError`]

pub mod calendar;
pub mod error;
pub mod request;
pub mod state;
pub mod tree;
pub mod types;

pub use calendar::{DateRange, Datetime360};
pub use error::CoreError;
pub use request::{RequestDescriptor, VariableEntry, DEFAULT_LAYOUT};
pub use state::{can_transition, VersionState};
pub use tree::{ArchiveRecord, ArchiveTree};
pub use types::{Datestamp, StreamId, TableName, VariableId, VariableName};
