use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

#[test]
fn default_run_commits_a_full_table() {
    let assert = Command::cargo_bin("encal_cli")
        .unwrap()
        .arg("--json")
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["ok"], true);
    assert_eq!(v["entries"], 16384);
    assert_eq!(v["table_valid"], true);
    assert_eq!(v["restart_required"], true);
    assert!(v["error"].is_null());
}

#[test]
fn human_output_mentions_the_entry_count() {
    Command::cargo_bin("encal_cli")
        .unwrap()
        .assert()
        .success()
        .stdout(predicate::str::contains("16384 entries"));
}

#[test]
fn toy_config_shrinks_the_table() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[geometry]
resolution_bits = 4
steps = 4
microsteps = 4
read_count = 2

[sim]
noise = false
distortion_amplitude = 0
phase_offset = 0
backlash_pulses = 0
"#
    )
    .unwrap();

    let assert = Command::cargo_bin("encal_cli")
        .unwrap()
        .arg("--json")
        .arg("--config")
        .arg(file.path())
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["ok"], true);
    assert_eq!(v["entries"], 16);
}

#[test]
fn invalid_config_fails_before_running() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[geometry]\nsteps = 3\n").unwrap();

    Command::cargo_bin("encal_cli")
        .unwrap()
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("steps"));
}
