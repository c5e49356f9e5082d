#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ROOT: &str = "moose:/adhoc/cdds";
const TAS: &str = "moose:/adhoc/cdds/ap5/Amon/tas";

fn monthly(start: &str, end: &str) -> String {
    format!("tas_Amon_UKESM1-0-LL_ssp126_r1i1p1f2_gn_{start}-{end}.nc")
}

/// Scratch area holding a stand-in `moo`, its call log, an optional archive
/// listing, the variable's output files and the request descriptor.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(files: &[String]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let output = dir.path().join("output");
        fs::create_dir(&output).expect("output dir");
        for name in files {
            fs::write(output.join(name), b"netcdf").expect("data file");
        }

        let script = dir.path().join("moo");
        let listing = dir.path().join("listing");
        let log = dir.path().join("calls.log");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\n\
                 echo \"$@\" >> '{log}'\n\
                 case \"$1\" in\n\
                 ls) if [ -f '{listing}' ]; then cat '{listing}'; \
                 else echo 'ERROR_CLIENT_PATH TSSC_FILE_DOES_NOT_EXIST' >&2; exit 2; fi ;;\n\
                 test) echo false ;;\n\
                 *) exit 0 ;;\n\
                 esac\n",
                log = log.display(),
                listing = listing.display(),
            ),
        )
        .expect("write moo");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");

        fs::write(
            dir.path().join("request.yaml"),
            format!(
                "archive_root: {ROOT}\n\
                 data_version: v20240315\n\
                 variables:\n\
                 \x20 - table: Amon\n\
                 \x20   name: tas\n\
                 \x20   stream: ap5\n\
                 \x20   frequency: mon\n\
                 \x20   output_dir: {}\n",
                output.display()
            ),
        )
        .expect("write request");

        Self { dir }
    }

    /// Archive listing returned by `moo ls -Rl`, one path per line.
    fn seed_listing(&self, dirs: &[&str], files: &[String]) {
        let mut lines: Vec<String> = dirs
            .iter()
            .map(|d| format!("D archivist moose 0 0 2024-01-01 00:00:00 GMT {d}"))
            .collect();
        lines.extend(
            files
                .iter()
                .map(|f| format!("F archivist moose 1 9 2024-01-01 00:00:00 GMT {f}")),
        );
        fs::write(self.path().join("listing"), lines.join("\n")).expect("listing");
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn request(&self) -> PathBuf {
        self.path().join("request.yaml")
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    fn archivist(&self, subcommand: &str) -> Command {
        let mut cmd = Command::cargo_bin("archivist").expect("archivist binary");
        cmd.env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg(subcommand)
            .arg(self.request())
            .arg("--moo")
            .arg(self.path().join("moo"));
        cmd
    }
}

fn seed_partial_overlap(fixture: &Fixture) {
    fixture.seed_listing(
        &[
            TAS,
            &format!("{TAS}/available"),
            &format!("{TAS}/available/v20190909"),
        ],
        &[format!(
            "{TAS}/available/v20190909/{}",
            monthly("196001", "201412")
        )],
    );
}

#[test]
fn first_publication_succeeds() {
    let fixture = Fixture::new(&[monthly("200001", "204912")]);

    fixture
        .archivist("publish")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Amon/tas FIRST_PUBLICATION under v20240315"))
        .stdout(predicate::str::contains("1 published, 0 blocked, 0 failed"));

    let calls = fixture.calls();
    assert!(calls.contains(&format!("mkdir -p {TAS}/embargoed/v20240315")));
    let put = calls
        .iter()
        .find(|c| c.starts_with("put "))
        .expect("put issued");
    assert!(put.ends_with(&format!("{TAS}/embargoed/v20240315")));
    assert!(put.contains(&monthly("200001", "204912")));
}

#[test]
fn blocked_variable_exits_with_two() {
    let fixture = Fixture::new(&[monthly("201001", "201912")]);
    seed_partial_overlap(&fixture);

    fixture
        .archivist("publish")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("blocked: PARTIALLY_PUBLISHED"));

    let calls = fixture.calls();
    assert!(calls.iter().all(|c| c.starts_with("ls ")), "{calls:?}");
}

#[test]
fn missing_request_exits_with_one() {
    let fixture = Fixture::new(&[]);
    fs::remove_file(fixture.request()).expect("remove request");

    fixture
        .archivist("publish")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load request descriptor"));
}

#[test]
fn simulate_reports_operations_without_issuing_them() {
    let fixture = Fixture::new(&[monthly("200001", "204912")]);

    fixture
        .archivist("publish")
        .arg("--simulate")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("[simulate]"))
        .stdout(predicate::str::contains(format!(
            "~  mkdir {TAS}/embargoed/v20240315"
        )));

    assert!(fixture.calls().iter().all(|c| c.starts_with("ls ")));
}

#[test]
fn stream_filter_can_leave_nothing_to_do() {
    let fixture = Fixture::new(&[monthly("200001", "204912")]);

    fixture
        .archivist("publish")
        .args(["--stream", "ap6", "--skip-cleanup"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("0 published, 0 blocked, 0 failed"));

    assert_eq!(fixture.calls(), vec![format!("ls -Rl {ROOT}")]);
}

#[test]
fn plan_json_reports_mode_and_target() {
    let fixture = Fixture::new(&[monthly("201001", "201912")]);
    seed_partial_overlap(&fixture);

    let output = fixture
        .archivist("plan")
        .args(["--json", "--data-version", "v20240401"])
        .output()
        .expect("run plan");
    assert_eq!(output.status.code(), Some(2));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("plan JSON");
    assert_eq!(report["datestamp"], "v20240401");
    let variable = &report["variables"][0];
    assert_eq!(variable["variable"], "Amon/tas");
    assert_eq!(variable["mode"], "PARTIALLY_PUBLISHED");
    assert_eq!(variable["valid"], false);
    assert_eq!(variable["target"], "v20240401");
    assert_eq!(variable["pending_files"], 1);

    assert!(fixture.calls().iter().all(|c| c.starts_with("ls ")));
}

#[test]
fn plan_table_lists_variables() {
    let fixture = Fixture::new(&[monthly("200001", "204912")]);

    fixture
        .archivist("plan")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Amon/tas"))
        .stdout(predicate::str::contains("FIRST_PUBLICATION"));
}

#[test]
fn clean_removes_empty_version_directories() {
    let fixture = Fixture::new(&[]);
    fixture.seed_listing(
        &[
            TAS,
            &format!("{TAS}/embargoed"),
            &format!("{TAS}/embargoed/v20240101"),
        ],
        &[],
    );

    fixture
        .archivist("clean")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("3 empty directories"));

    let removals: Vec<String> = fixture
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("rmdir "))
        .collect();
    assert_eq!(
        removals,
        vec![
            format!("rmdir {TAS}/embargoed/v20240101"),
            format!("rmdir {TAS}/embargoed"),
            format!("rmdir {TAS}"),
        ]
    );
}
