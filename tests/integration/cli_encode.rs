#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::TempDir;

const RESULT_DOC: &str = r#"{
    "attributes": {"label": "Parts"},
    "source_table": "P",
    "columns": [
        {"name": "id", "attributes": {"_id": 0}},
        {"name": "weight", "attributes": {"unit": "kg", "flag": null}, "computed": ["flag"]},
        {"name": "due", "attributes": {"format": {"$expr": "fmt(d)", "translations": {"js": "fmt(d, 'js')"}}}}
    ],
    "rows": [
        [1, {"$v": 12.5, "$m": {"flag": "heavy"}}, {"$date": "2022-01-05"}],
        [2, 3.25, {"$datetime": "2022-01-05 08:30:00"}]
    ]
}"#;

const RELATION_DOC: &str = r#"{
    "name": "T",
    "columns": [
        {"name": "b", "attributes": {"label": "B"}},
        {"name": "e", "derived": "b + c"}
    ]
}"#;

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn rowjson() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowjson"));
    cmd.env_remove("ROWJSON_LOG");
    cmd
}

fn run_json(args: &[&str], path: &Path) -> Value {
    let output = rowjson()
        .args(args)
        .arg(path)
        .output()
        .expect("run rowjson");
    assert!(
        output.status.success(),
        "rowjson failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn result_command_writes_envelope() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, "result.json", RESULT_DOC);
    let doc = run_json(&["result"], &path);
    assert_eq!(doc["$m"], json!({"label": "Parts", "type": "P"}));
    assert_eq!(doc["columns"]["id"], json!({}));
    assert_eq!(doc["columns"]["weight"], json!({"unit": "kg"}));
    assert_eq!(doc["columns"]["due"]["format"], json!("$(fmt(d, 'js'))"));
    assert_eq!(
        doc["rows"],
        json!([
            [1, {"$v": 12.5, "$m": {"flag": "heavy"}}, "2022-01-05"],
            [2, 3.25, "2022-01-05 08:30:00"]
        ])
    );
}

#[test]
fn flags_override_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, "result.json", RESULT_DOC);
    let rows = run_json(&["--rows-only", "--target", "native", "result"], &path);
    assert_eq!(rows.as_array().map(Vec::len), Some(2));

    let structure = run_json(&["result", "--structure-only"], &path);
    assert!(structure.get("rows").is_none());

    let native = run_json(&["--target", "native", "--structure-only", "result"], &path);
    assert_eq!(native["columns"]["due"]["format"], json!("$(fmt(d))"));
}

#[test]
fn config_file_is_applied() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, "result.json", RESULT_DOC);
    let config = write_fixture(&dir, "encoder.toml", "indent = 0\nrows_only = true\n");
    let output = rowjson()
        .arg("--config")
        .arg(&config)
        .arg("result")
        .arg(&path)
        .output()
        .expect("run rowjson");
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("[\n[1, "));
}

#[test]
fn relation_command_writes_structure() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, "relation.json", RELATION_DOC);
    let doc = run_json(&["relation"], &path);
    assert_eq!(
        doc,
        json!({
            "$m": {"type": "T"},
            "columns": {"b": {"label": "B"}, "e": {"derived_expression": "$(b + c)"}}
        })
    );
}

#[test]
fn missing_file_fails_with_message() {
    let dir = TempDir::new().expect("tempdir");
    let output = rowjson()
        .arg("result")
        .arg(dir.path().join("absent.json"))
        .output()
        .expect("run rowjson");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error:"));
}

#[test]
fn unknown_dialect_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, "relation.json", RELATION_DOC);
    rowjson()
        .args(["--target", "cobol", "relation"])
        .arg(&path)
        .assert()
        .failure();
}
