//! CLI behaviour: import, compare and results against a scratch database.
#![allow(clippy::unwrap_used)]

mod common;

use anyhow::Result;
use assert_cmd::Command;
use common::three_author_lab;
use labsim::entry_point::run_with_args_to;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_import_file(dir: &Path) -> Result<PathBuf> {
    let records: Vec<Value> = three_author_lab()
        .into_iter()
        .map(|s| {
            let mut value = serde_json::to_value(s).unwrap();
            value["labId"] = json!("lab-1");
            value
        })
        .collect();
    let path = dir.join("submissions.json");
    fs::write(&path, serde_json::to_string_pretty(&records)?)?;
    Ok(path)
}

fn labsim(dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("labsim-bin")?;
    cmd.current_dir(dir.path())
        .env_remove("LABSIM_DB")
        .env_remove("LABSIM_LOG");
    Ok(cmd)
}

#[test]
fn test_help_and_version() {
    let mut out = Vec::new();
    assert_eq!(run_with_args_to(vec!["--help".to_owned()], &mut out).unwrap(), 0);
    let help = String::from_utf8(out).unwrap();
    assert!(help.contains("compare"));
    assert!(help.contains("labsim.toml"));

    let mut out = Vec::new();
    assert_eq!(run_with_args_to(vec!["--version".to_owned()], &mut out).unwrap(), 0);
}

#[test]
fn test_unknown_subcommand_fails() {
    let mut out = Vec::new();
    assert_eq!(run_with_args_to(vec!["bogus".to_owned()], &mut out).unwrap(), 1);
}

#[test]
fn test_import_compare_results() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_import_file(dir.path())?;
    let db = dir.path().join("labsim.db");

    labsim(&dir)?
        .arg("import")
        .arg(&input)
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("lab-1"));

    let output = labsim(&dir)?
        .args(["compare", "lab-1", "--json", "--db"])
        .arg(&db)
        .output()?;
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(body["success"], true);
    assert_eq!(body["comparisons"], 3);
    assert_eq!(body["potentialMatches"], 2);
    assert_eq!(body["flagged"], 1);

    let output = labsim(&dir)?
        .args(["results", "lab-1", "--json", "--db"])
        .arg(&db)
        .output()?;
    assert!(output.status.success());
    let rows: Value = serde_json::from_slice(&output.stdout)?;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["submission_1_id"], "sub-a");
    assert_eq!(rows[0]["submission_2_id"], "sub-b");
    assert_eq!(rows[0]["flagged"], true);
    Ok(())
}

#[test]
fn test_compare_table_output() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_import_file(dir.path())?;
    let db = dir.path().join("labsim.db");

    labsim(&dir)?
        .arg("import")
        .arg(&input)
        .arg("--db")
        .arg(&db)
        .assert()
        .success();

    labsim(&dir)?
        .env("NO_COLOR", "1")
        .args(["compare", "lab-1", "--threshold", "40", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("72.82%"))
        .stdout(predicate::str::contains("48.68%"));
    Ok(())
}

#[test]
fn test_config_file_supplies_database_and_flag_threshold() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_import_file(dir.path())?;
    fs::write(
        dir.path().join("labsim.toml"),
        "[labsim]\ndatabase = \"from-config.db\"\nflag_threshold = 50\n",
    )?;

    labsim(&dir)?.arg("import").arg(&input).assert().success();
    assert!(dir.path().join("from-config.db").exists());

    let output = labsim(&dir)?.args(["compare", "lab-1", "--json"]).output()?;
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(body["flagged"], 2);
    Ok(())
}

#[test]
fn test_missing_database_fails() -> Result<()> {
    let dir = TempDir::new()?;
    labsim(&dir)?
        .args(["compare", "lab-1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no database"));
    Ok(())
}

#[test]
fn test_non_finite_threshold_rejected_in_json_mode() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_import_file(dir.path())?;
    let db = dir.path().join("labsim.db");
    labsim(&dir)?
        .arg("import")
        .arg(&input)
        .arg("--db")
        .arg(&db)
        .assert()
        .success();

    for value in ["NaN", "inf"] {
        let output = labsim(&dir)?
            .args(["compare", "lab-1", "--json", "--threshold", value, "--db"])
            .arg(&db)
            .output()?;
        assert_eq!(output.status.code(), Some(1), "{value}");
        let body: Value = serde_json::from_slice(&output.stdout)?;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("threshold must be between 0 and 100"));
        assert!(body.get("success").is_none());
    }

    let output = labsim(&dir)?
        .args(["results", "lab-1", "--json", "--db"])
        .arg(&db)
        .output()?;
    let rows: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(rows.as_array().map(Vec::len), Some(0));
    Ok(())
}

#[test]
fn test_out_of_range_threshold_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let db = dir.path().join("labsim.db");
    let output = labsim(&dir)?
        .args(["compare", "lab-1", "--json", "--threshold", "150", "--db"])
        .arg(&db)
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    let body: Value = serde_json::from_slice(&output.stdout)?;
    assert!(body["error"].as_str().unwrap().contains("threshold"));
    Ok(())
}

#[test]
fn test_insufficient_lab_json() -> Result<()> {
    let dir = TempDir::new()?;
    let db = dir.path().join("labsim.db");
    let output = labsim(&dir)?
        .args(["compare", "empty-lab", "--json", "--db"])
        .arg(&db)
        .output()?;
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(body["message"], "Not enough submissions to compare");
    assert_eq!(body["comparisons"], 0);
    Ok(())
}

#[test]
fn test_import_missing_file_fails() -> Result<()> {
    let dir = TempDir::new()?;
    labsim(&dir)?
        .args(["import", "nope.json", "--db", "x.db"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}
