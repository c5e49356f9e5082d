//! Archivist: publish model output to the tape archive.
//!
//! # Usage
//!
//! ```text
//! archivist publish <request.yaml> [--stream <id>] [--data-version vYYYYMMDD] [--simulate] [--skip-cleanup]
//! archivist plan <request.yaml> [--stream <id>] [--json]
//! archivist clean <request.yaml> [--stream <id>] [--simulate]
//! ```
//!
//! Exit status: 0 when every variable was handled, 2 when at least one
//! variable was blocked by the planner, 1 on any other failure.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{clean::CleanArgs, plan::PlanArgs, publish::PublishArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "archivist",
    version,
    about = "Decide how model output is published to the archive and carry it out",
    long_about = None,
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish every variable of a request descriptor.
    Publish(PublishArgs),

    /// Show the publication mode each variable would get, without changes.
    Plan(PlanArgs),

    /// Remove empty archive directories below the request's variables.
    Clean(CleanArgs),
}

/// How a command finished when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// One or more variables were refused by the planner.
    Blocked,
    /// One or more variables failed unexpectedly.
    Failed,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failed => ExitCode::from(1),
            Status::Blocked => ExitCode::from(2),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli.command) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(1)
        }
    }
}

fn dispatch(command: Commands) -> Result<Status> {
    match command {
        Commands::Publish(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Clean(args) => args.run(),
    }
}

/// Logs go to stderr so that stdout stays parseable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
