use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn unitsync() -> Command {
    Command::cargo_bin("unitsync").expect("unitsync binary")
}

#[test]
fn sync_on_empty_source_reports_nothing_to_do() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    unitsync()
        .arg("sync")
        .arg("--src")
        .arg(src.path())
        .arg("--dest")
        .arg(dest.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to do"));
}

#[test]
fn sync_json_emits_pass_report() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    // Editor artifacts never become units, so no systemctl call is made.
    std::fs::write(src.path().join("a.service.swp"), "swap").unwrap();

    let output = unitsync()
        .arg("sync")
        .arg("--json")
        .arg("--src")
        .arg(src.path())
        .arg("--dest")
        .arg(dest.path())
        .output()
        .expect("run unitsync sync --json");
    assert!(
        output.status.success(),
        "command failed: status={} stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr),
    );

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON pass report");
    assert_eq!(report["converged"], serde_json::Value::Bool(true));
    assert_eq!(report["actions"].as_array().map(Vec::len), Some(0));
    assert!(!dest.path().join("a.service.swp").exists());
}

#[test]
fn sync_with_missing_source_fails() {
    let root = TempDir::new().unwrap();

    unitsync()
        .arg("sync")
        .arg("--src")
        .arg(root.path().join("missing"))
        .arg("--dest")
        .arg(root.path().join("dest"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not converge"));
}

#[test]
fn run_rejects_malformed_durations() {
    unitsync()
        .args(["run", "--resync", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'soon'"));
}

#[test]
fn help_lists_commands() {
    unitsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("sync")));
}
