//! Integration tests for the `onyx export` command.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// `onyx` isolated from any config files or `ONYX_*` variables on the host.
fn onyx(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("onyx").unwrap();
    cmd.current_dir(temp.path()).env("HOME", temp.path()).env("NO_COLOR", "1");
    for (name, _) in std::env::vars().filter(|(name, _)| name.starts_with("ONYX_")) {
        cmd.env_remove(name);
    }
    cmd
}

fn read_metadata(models_dir: &Path) -> Vec<Value> {
    let text = fs::read_to_string(models_dir.join("metadata.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_export_records_failures_and_existing_models() {
    let temp = TempDir::new().unwrap();
    let models = temp.path().join("models");
    fs::create_dir_all(&models).unwrap();
    fs::write(models.join("face-detection-yunet.onnx"), vec![0u8; 2048]).unwrap();

    onyx(&temp)
        .args(["export", "--offline", "--exporter", "onyx-no-such-exporter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Succeeded: 1"))
        .stdout(predicate::str::contains("Failed: 4"));

    let entries = read_metadata(&models);
    let ids: Vec<_> = entries.iter().map(|e| e["id"].as_str().unwrap()).collect();
    assert_eq!(
        ids,
        vec!["yolov8n-coco", "yolov8n-seg", "yolov8n-pose", "face-detection-yunet", "mobilenetv2-imagenet"]
    );
    assert!(entries[..3].iter().all(|e| e["status"] == "failed"));
    assert!(entries[0]["errorDetail"].as_str().unwrap().contains("onyx-no-such-exporter"));
    assert_eq!(entries[3]["status"], "exists");
    assert_eq!(entries[3]["sizeBytes"], 2048);
    assert_eq!(entries[3]["inputShape"]["width"], 320);
    assert_eq!(entries[4]["status"], "failed");
}

#[test]
fn test_export_writes_utf8_metadata() {
    let temp = TempDir::new().unwrap();

    onyx(&temp).args(["export", "--offline", "--exporter", "onyx-no-such-exporter"]).assert().success();

    let text = fs::read_to_string(temp.path().join("models").join("metadata.json")).unwrap();
    assert!(text.contains("Modelo de detección de objetos"));
    assert!(text.starts_with("[\n  {\n    \"id\": \"yolov8n-coco\""));
}

#[test]
fn test_export_json_output() {
    let temp = TempDir::new().unwrap();
    let out_dir = temp.path().join("out");

    let output = onyx(&temp)
        .args(["export", "--json", "--offline", "--exporter", "onyx-no-such-exporter", "--models-dir"])
        .arg(&out_dir)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["failed"], 5);
    assert_eq!(value["summary"]["succeeded"], 0);
    assert_eq!(value["results"].as_array().unwrap().len(), 5);
    assert!(out_dir.join("metadata.json").is_file());
}

#[cfg(unix)]
#[test]
fn test_export_with_custom_catalog_and_exporter() {
    let temp = TempDir::new().unwrap();
    let staging = temp.path().join("staging");
    fs::create_dir_all(&staging).unwrap();
    // `sh export model=...` runs this script in the staging directory.
    fs::write(
        staging.join("export"),
        "case \"$1\" in\n  model=m1.pt) head -c 5242880 /dev/zero > m1.onnx; echo \"saved as 'm1.onnx'\";;\n  *) echo 'file not found' >&2; exit 1;;\nesac\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("catalog.toml"),
        r#"
[export]
format = "onnx"
opset = 12

[[models]]
id = "m1"
sourceRef = "m1.pt"
name = "Model One"

[[models]]
id = "m2"
sourceRef = "m2.pt"
name = "Model Two"
"#,
    )
    .unwrap();

    onyx(&temp)
        .args(["export", "--catalog", "catalog.toml", "--exporter", "sh", "--work-dir", "staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Succeeded: 1"))
        .stdout(predicate::str::contains("Failed: 1"))
        .stdout(predicate::str::contains("Total size: 5.00 MB"));

    let entries = read_metadata(&temp.path().join("models"));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["status"], "success");
    assert_eq!(entries[0]["artifactFilename"], "m1.onnx");
    assert_eq!(entries[0]["sizeBytes"], 5_242_880);
    assert_eq!(entries[1]["status"], "failed");
    assert_eq!(entries[1]["errorDetail"], "file not found");
    assert!(temp.path().join("models").join("m1.onnx").is_file());
}

#[test]
fn test_export_uses_models_dir_from_config_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("onyx.toml"),
        "models_dir = \"artifacts\"\n\n[exporter]\ncommand = \"onyx-no-such-exporter\"\n",
    )
    .unwrap();

    onyx(&temp).args(["export", "--offline"]).assert().success();

    assert!(temp.path().join("artifacts").join("metadata.json").is_file());
}

#[test]
fn test_export_fails_when_models_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("models"), "not a directory").unwrap();

    onyx(&temp)
        .args(["export", "--offline", "--exporter", "onyx-no-such-exporter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Export run aborted"));
}

#[test]
fn test_export_downloads_missing_pre_built_model() {
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/yunet.onnx").with_status(200).with_body(vec![1u8; 1024]).create();

    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("catalog.toml"),
        format!(
            "[[models]]\nid = \"face-detection-yunet\"\nname = \"YuNet\"\nalreadyPresent = true\nurl = \"{}/yunet.onnx\"\n",
            server.url()
        ),
    )
    .unwrap();

    onyx(&temp)
        .args(["export", "--catalog", "catalog.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("downloaded face-detection-yunet.onnx"))
        .stdout(predicate::str::contains("Succeeded: 1"));

    mock.assert();
    let entries = read_metadata(&temp.path().join("models"));
    assert_eq!(entries[0]["status"], "exists");
    assert_eq!(entries[0]["sizeBytes"], 1024);
    assert!(entries[0]["url"].as_str().unwrap().ends_with("/yunet.onnx"));
}
