//! # archivist-publish
//!
//! Publication planning and archive mutation.
//!
//! [`pipeline::run`] drives a batch: it cleans empty directories, lists the
//! archive once, then for each variable derives the stored versions
//! ([`inventory`]), decides a [`PublicationMode`] ([`planner`]) and carries
//! it out ([`emitter`]).

pub mod cleanup;
pub mod emitter;
pub mod error;
pub mod inventory;
pub mod pipeline;
pub mod planner;

pub use emitter::{emit, execute, OpOutcome, TransportOp};
pub use error::PublishError;
pub use pipeline::{BatchSummary, PublishOptions, VariableOutcome, VariableReport};
pub use planner::{plan, PublicationMode, PublicationPlan, PublicationRequest, PublicationVersion};
