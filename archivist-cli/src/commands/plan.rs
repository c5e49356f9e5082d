//! `archivist plan`: report the publication decision for each variable.
//!
//! Lists the archive once and runs the planner, but issues no mutation.

use anyhow::{Context, Result};
use archivist_dates::DateRangeCalculator;
use archivist_publish::pipeline::{self, Assessment};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::RequestArgs;
use crate::Status;

/// Arguments for `archivist plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Print machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PlanReport {
    datestamp: String,
    variables: Vec<VariablePlan>,
}

#[derive(Debug, Serialize)]
struct VariablePlan {
    variable: String,
    stream: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    valid: bool,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retires: Option<String>,
    pending_files: usize,
    stored_files: usize,
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "Variable")]
    variable: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Local range")]
    local_range: String,
    #[tabled(rename = "Retires")]
    retires: String,
    #[tabled(rename = "Files")]
    files: String,
}

impl PlanArgs {
    pub fn run(self) -> Result<Status> {
        let descriptor = self.request.load()?;
        let transport = self.request.transport();
        let assessments =
            pipeline::assess_all(&transport, &descriptor, &DateRangeCalculator::default())
                .with_context(|| format!("failed to list {}", descriptor.archive_root))?;

        let report = PlanReport {
            datestamp: descriptor.datestamp().to_string(),
            variables: assessments
                .into_iter()
                .map(|(id, assessment)| match assessment {
                    Ok(a) => describe(&a),
                    Err(error) => VariablePlan {
                        variable: id.to_string(),
                        stream: id.stream.to_string(),
                        mode: None,
                        valid: false,
                        detail: error.to_string(),
                        target: None,
                        local_range: None,
                        retires: None,
                        pending_files: 0,
                        stored_files: 0,
                    },
                })
                .collect(),
        };

        let status = if report.variables.iter().any(|v| v.mode.is_none()) {
            Status::Failed
        } else if report.variables.iter().any(|v| !v.valid) {
            Status::Blocked
        } else {
            Status::Success
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize plan JSON")?
            );
        } else {
            print_table(report);
        }
        Ok(status)
    }
}

fn describe(assessment: &Assessment) -> VariablePlan {
    let plan = &assessment.plan;
    let pending = assessment
        .local_files
        .iter()
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            !plan.stored.contains(&name)
        })
        .count();

    VariablePlan {
        variable: assessment.request.variable.to_string(),
        stream: assessment.request.variable.stream.to_string(),
        mode: Some(plan.mode.label().to_string()),
        valid: plan.mode.valid(),
        detail: plan.mode.description().to_string(),
        target: Some(plan.target.to_string()),
        local_range: Some(assessment.request.local_range.to_string()),
        retires: plan
            .predecessor
            .as_ref()
            .map(|p| format!("{} {}", p.state, p.datestamp)),
        pending_files: pending,
        stored_files: plan.stored.len(),
    }
}

fn print_table(report: PlanReport) {
    println!(
        "Archivist v{} | {} variable(s) | datestamp {}",
        env!("CARGO_PKG_VERSION"),
        report.variables.len(),
        report.datestamp
    );
    if report.variables.is_empty() {
        println!("No variables to publish.");
        return;
    }

    let blocked = report.variables.iter().filter(|v| !v.valid).count();
    let rows: Vec<PlanTableRow> = report
        .variables
        .into_iter()
        .map(|v| {
            let mode = match (&v.mode, v.valid) {
                (Some(mode), true) => mode.green().to_string(),
                (Some(mode), false) => mode.red().bold().to_string(),
                (None, _) => "ERROR".red().bold().to_string(),
            };
            PlanTableRow {
                variable: v.variable,
                mode,
                target: v.target.unwrap_or_else(|| "-".into()),
                local_range: v.local_range.unwrap_or_else(|| v.detail.clone()),
                retires: v.retires.unwrap_or_else(|| "-".into()),
                files: format!("{} new / {} stored", v.pending_files, v.stored_files),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if blocked > 0 {
        println!(
            "{} variable(s) cannot be published as requested.",
            blocked.to_string().red().bold()
        );
    }
}
