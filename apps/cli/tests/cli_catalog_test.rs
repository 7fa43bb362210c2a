//! Integration tests for `onyx catalog` and `onyx upload` argument handling.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn onyx(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("onyx").unwrap();
    cmd.current_dir(temp.path()).env("HOME", temp.path()).env("NO_COLOR", "1");
    for (name, _) in std::env::vars().filter(|(name, _)| name.starts_with("ONYX_")) {
        cmd.env_remove(name);
    }
    cmd
}

#[test]
fn test_catalog_list_shows_builtin_models() {
    let temp = TempDir::new().unwrap();
    onyx(&temp)
        .args(["catalog", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("yolov8n-coco"))
        .stdout(predicate::str::contains("mobilenetv2-imagenet"))
        .stdout(predicate::str::contains("(download)"))
        .stdout(predicate::str::contains("╭"))
        .stdout(predicate::str::contains("│ ID"))
        .stdout(predicate::str::contains("opset=12"));
}

#[test]
fn test_catalog_list_upload_json() {
    let temp = TempDir::new().unwrap();
    let output = onyx(&temp).args(["catalog", "list", "--upload", "--json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let sources: Vec<_> = value["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["sourceRef"].as_str().unwrap())
        .collect();
    assert_eq!(sources, vec!["yolov8n.pt", "yolov11n.pt", "yolov8n-seg.pt", "yolov8n-pose.pt"]);
    assert_eq!(value["export"]["simplify"], true);
}

#[test]
fn test_catalog_check_accepts_valid_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("ok.toml"),
        "[[models]]\nid = \"m1\"\nsourceRef = \"m1.pt\"\nname = \"One\"\n",
    )
    .unwrap();

    onyx(&temp)
        .args(["catalog", "check", "ok.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 models"));
}

#[test]
fn test_catalog_check_rejects_duplicates() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("dup.toml"),
        "[[models]]\nid = \"m1\"\nsourceRef = \"a.pt\"\nname = \"A\"\n\n[[models]]\nid = \"m1\"\nsourceRef = \"b.pt\"\nname = \"B\"\n",
    )
    .unwrap();

    onyx(&temp)
        .args(["catalog", "check", "dup.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate model id"));
}

#[test]
fn test_upload_requires_public_url() {
    let temp = TempDir::new().unwrap();
    onyx(&temp)
        .arg("upload")
        .assert()
        .failure()
        .stderr(predicate::str::contains("public URL is required"));
}

#[test]
fn test_upload_requires_credentials() {
    let temp = TempDir::new().unwrap();
    onyx(&temp)
        .args(["upload", "--public-url", "https://pub-xxx.r2.dev"])
        .env("ONYX_R2_ACCOUNT_ID", "abc123")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create storage client"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("onyx.toml"), "models_dir = [").unwrap();

    onyx(&temp)
        .args(["catalog", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_export_catalog_from_config_is_not_used_by_upload_listing() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("my-export.toml"),
        "[[models]]\nid = \"custom-only\"\nsourceRef = \"custom.pt\"\nname = \"Custom\"\n",
    )
    .unwrap();
    fs::write(temp.path().join("onyx.toml"), "export_catalog = \"my-export.toml\"\n").unwrap();

    onyx(&temp)
        .args(["catalog", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom-only"));

    onyx(&temp)
        .args(["catalog", "list", "--upload"])
        .assert()
        .success()
        .stdout(predicate::str::contains("yolov8n-pose"))
        .stdout(predicate::str::contains("custom-only").not());
}

#[test]
fn test_upload_reads_its_own_catalog_setting() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("onyx.toml"),
        "export_catalog = \"my-export.toml\"\nupload_catalog = \"my-upload.toml\"\n",
    )
    .unwrap();

    onyx(&temp)
        .args(["upload", "--public-url", "https://pub-xxx.r2.dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("my-upload.toml"))
        .stderr(predicate::str::contains("my-export.toml").not());
}
