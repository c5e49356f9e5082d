//! `archivist clean`: remove empty archive directories.

use anyhow::{Context, Result};
use archivist_publish::cleanup;
use clap::Args;

use super::RequestArgs;
use crate::Status;

/// Arguments for `archivist clean`.
#[derive(Args, Debug)]
pub struct CleanArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// List the removable directories without removing them.
    #[arg(long)]
    pub simulate: bool,
}

impl CleanArgs {
    pub fn run(self) -> Result<Status> {
        let descriptor = self.request.load()?;
        let removed = cleanup::clean(&self.request.transport(), &descriptor, self.simulate)
            .with_context(|| format!("cleanup below {} failed", descriptor.archive_root))?;

        let prefix = if self.simulate { "[simulate] " } else { "" };
        if removed.is_empty() {
            println!("{prefix}✓ no empty directories");
        } else {
            println!("{prefix}✓ {} empty directories", removed.len());
            for dir in &removed {
                println!("  -  {dir}");
            }
        }
        Ok(Status::Success)
    }
}
