use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(kind: &str, name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join(kind).join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("sketchflow-cli"))
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn detect_reports_kind_and_support() {
    let output = cli()
        .args(["detect", fixture("state", "basic.mmd").to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["diagramType"], "stateDiagram");
    assert_eq!(json["supported"], true);
}

#[test]
fn convert_prints_scene_with_metadata() {
    let output = cli()
        .args(["convert", fixture("flowchart", "basic.mmd").to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert!(output.status.success());
    let json = stdout_json(&output);
    let elements = json["elements"].as_array().expect("elements");
    assert!(!elements.is_empty());
    assert!(json["metadata"]["originalDescription"]
        .as_str()
        .unwrap()
        .starts_with("graph TD"));
}

#[test]
fn classify_reads_stdin() {
    let output = cli()
        .args(["classify", "-"])
        .write_stdin(r#"[{"type": "diamond", "label": "ok?"}, {"x": 1}]"#)
        .output()
        .expect("run");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["origin"], "sceneArray");
    assert_eq!(json["elements"].as_array().unwrap().len(), 2);
}

#[test]
fn normalize_file_without_measurer() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("candidates.json");
    fs::copy(fixture("scene", "candidates.json"), &input).expect("copy fixture");

    let output = cli()
        .args([
            "normalize",
            "--no-measure",
            "--pretty",
            input.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json.as_array().unwrap().len(), 6);
}

#[test]
fn config_overrides_are_applied() {
    let output = cli()
        .args(["normalize", "--config", r#"{"normalize": {"labelFontSize": 10}}"#])
        .write_stdin(r#"[{"type": "rectangle", "label": "x"}]"#)
        .output()
        .expect("run");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json[1]["fontSize"], 10.0);
}

#[test]
fn unsupported_diagrams_fail_with_exit_code_1() {
    cli()
        .arg("convert")
        .write_stdin("pie\n  \"a\": 1")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn invalid_config_fails_with_exit_code_1() {
    cli()
        .args(["convert", "--config", "[1, 2]"])
        .write_stdin("graph TD\nA-->B")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn unknown_flags_are_usage_errors() {
    cli().arg("--frobnicate").assert().failure().code(2);
    cli().args(["detect", "a.mmd", "b.mmd"]).assert().failure().code(2);
}
