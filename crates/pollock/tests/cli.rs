use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn pollock(config_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pollock"))
        .env("POLLOCK_CONFIG_DIR", config_dir.path())
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run pollock")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

#[test]
fn generate_prints_glsl_for_a_seed() {
    let root = TempDir::new().unwrap();
    let output = pollock(&root, &["generate", "--seed", "0"]);
    assert!(output.status.success(), "{output:?}");

    let source = stdout(&output);
    assert!(source.starts_with("#version 450"));
    assert!(source.contains("void main()"));
    assert!(source.contains("rgb = fSub3(rgb, "));
    assert!(!source.contains('@'));
}

#[test]
fn generate_is_deterministic_per_seed() {
    let root = TempDir::new().unwrap();
    let first = pollock(&root, &["generate", "--seed", "1234"]);
    let second = pollock(&root, &["generate", "--seed", "1234"]);
    let other = pollock(&root, &["generate", "--seed", "1235"]);
    assert!(first.status.success() && second.status.success() && other.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_ne!(first.stdout, other.stdout);
}

#[test]
fn generate_writes_hlsl_to_a_file() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("shader.hlsl");
    let output = pollock(
        &root,
        &[
            "generate",
            "--seed",
            "9",
            "--language",
            "hlsl",
            "--static",
            "--output",
            path.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{output:?}");
    assert!(output.stdout.is_empty());

    let source = fs::read_to_string(&path).unwrap();
    assert!(source.contains("SV_TARGET"));
    assert!(!source.contains("sinTime"));
    assert!(!source.contains("cosTime"));
}

#[test]
fn inspect_reports_seed_zero_structure() {
    let root = TempDir::new().unwrap();
    let output = pollock(&root, &["inspect", "--seed", "0"]);
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("max_depth:    12"), "{text}");
    assert!(text.contains("mask:         fSub3(rgb, @)"), "{text}");
    assert!(text.contains("nodes:        910"), "{text}");
}

#[test]
fn inspect_json_honours_fixed_depth() {
    let root = TempDir::new().unwrap();
    let output = pollock(&root, &["inspect", "--seed", "0", "--depth", "3", "--json"]);
    assert!(output.status.success(), "{output:?}");

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["seed"], 0);
    assert_eq!(report["max_depth"], 3);
    assert_eq!(report["mask"], "fInv3(fAdd3(rgb, @))");
    assert_eq!(report["nodes"], 25);
}

#[test]
fn config_file_supplies_defaults() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("config.toml"),
        "version = 1\n\n[generator]\nseed = 0\ndepth = 3\n",
    )
    .unwrap();

    let output = pollock(&root, &["inspect", "--json"]);
    assert!(output.status.success(), "{output:?}");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["seed"], 0);
    assert_eq!(report["max_depth"], 3);
}

#[test]
fn survey_counts_masks_and_depths() {
    let root = TempDir::new().unwrap();
    let output = pollock(&root, &["survey", "--samples", "40", "--json"]);
    assert!(output.status.success(), "{output:?}");

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["samples"], 40);
    let masks: u64 = report["masks"]
        .as_object()
        .unwrap()
        .values()
        .map(|count| count.as_u64().unwrap())
        .sum();
    assert_eq!(masks, 40);
}

#[test]
fn invalid_config_is_reported() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("broken.toml");
    fs::write(&path, "version = 2\n").unwrap();

    let output = pollock(
        &root,
        &["--config", path.to_str().unwrap(), "generate", "--seed", "1"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported config version 2"), "{stderr}");
}
