//! `archivist publish`: plan and carry out the publication of a request.

use anyhow::{Context, Result};
use archivist_dates::DateRangeCalculator;
use archivist_publish::{
    pipeline::{self, PublishOptions},
    BatchSummary, OpOutcome, VariableOutcome,
};
use clap::Args;
use colored::Colorize;

use super::RequestArgs;
use crate::Status;

/// Arguments for `archivist publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Log the archive operations instead of issuing them.
    #[arg(long)]
    pub simulate: bool,

    /// Do not remove empty directories before planning.
    #[arg(long)]
    pub skip_cleanup: bool,
}

impl PublishArgs {
    pub fn run(self) -> Result<Status> {
        let descriptor = self.request.load()?;
        let transport = self.request.transport();
        let options = PublishOptions {
            simulate: self.simulate,
            skip_cleanup: self.skip_cleanup,
        };

        let summary = pipeline::run(
            &transport,
            &descriptor,
            &DateRangeCalculator::default(),
            &options,
        )
        .with_context(|| format!("publication of {} failed", self.request.request.display()))?;

        print_summary(&summary, self.simulate);

        if summary.blocked() > 0 {
            tracing::error!(
                "{} variable(s) blocked by publication conflicts",
                summary.blocked()
            );
        }
        Ok(status_of(&summary))
    }
}

/// Failures outrank blocked variables.
pub(crate) fn status_of(summary: &BatchSummary) -> Status {
    if summary.failed() > 0 {
        Status::Failed
    } else if summary.blocked() > 0 {
        Status::Blocked
    } else {
        Status::Success
    }
}

fn print_summary(summary: &BatchSummary, simulate: bool) {
    let prefix = if simulate { "[simulate] " } else { "" };

    for dir in &summary.cleaned {
        println!("{prefix}-  rmdir {dir}");
    }

    for report in &summary.reports {
        match &report.outcome {
            VariableOutcome::Published { plan, outcomes } => {
                println!(
                    "{prefix}{} {} {} under {}",
                    "✓".green(),
                    report.variable,
                    plan.mode,
                    plan.target
                );
                for outcome in outcomes {
                    let marker = match outcome {
                        OpOutcome::Applied { .. } => "✎",
                        OpOutcome::Simulated { .. } => "~",
                        OpOutcome::AlreadyPresent { .. } => "·",
                    };
                    println!("  {marker}  {}", outcome.op().summary());
                }
            }
            VariableOutcome::Blocked { mode } => println!(
                "{prefix}{} {} blocked: {mode} ({})",
                "✗".red(),
                report.variable,
                mode.description()
            ),
            VariableOutcome::Failed { error } => println!(
                "{prefix}{} {} failed: {error}",
                "✗".red(),
                report.variable
            ),
        }
    }

    println!(
        "{prefix}{} published, {} blocked, {} failed",
        summary.published(),
        summary.blocked(),
        summary.failed()
    );
}
