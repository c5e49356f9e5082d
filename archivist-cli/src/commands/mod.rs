//! Subcommand implementations.

pub mod clean;
pub mod plan;
pub mod publish;

use std::path::PathBuf;

use anyhow::{Context, Result};
use archivist_core::{request, Datestamp, RequestDescriptor, StreamId};
use archivist_transport::MooTransport;
use clap::Args;

/// Options shared by every subcommand that reads a request descriptor.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Path to the request descriptor (YAML).
    pub request: PathBuf,

    /// Only handle the variables of this stream.
    #[arg(long)]
    pub stream: Option<String>,

    /// Publish under this datestamp instead of the descriptor's (or today's).
    #[arg(long, value_name = "vYYYYMMDD")]
    pub data_version: Option<Datestamp>,

    /// Archive client binary to run.
    #[arg(long, value_name = "BINARY", default_value = "moo")]
    pub moo: PathBuf,
}

impl RequestArgs {
    /// Load the descriptor and apply the command-line overrides.
    pub fn load(&self) -> Result<RequestDescriptor> {
        let mut descriptor = request::load_at(&self.request).with_context(|| {
            format!(
                "failed to load request descriptor {}",
                self.request.display()
            )
        })?;

        if let Some(stream) = &self.stream {
            descriptor.retain_stream(&StreamId::from(stream.as_str()));
            if descriptor.variables.is_empty() {
                tracing::warn!("no variables in stream {stream}");
            }
        }
        if let Some(version) = &self.data_version {
            descriptor.data_version = Some(version.clone());
        }
        Ok(descriptor)
    }

    pub fn transport(&self) -> MooTransport {
        MooTransport::new(self.moo.clone())
    }
}
