//! Integration tests for the preflight binary.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn create_file(dir: &TempDir, rel: &str) {
    let path = dir.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "// test").unwrap();
}

fn demo_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    create_file(&dir, "src/main.cpp");
    create_file(&dir, "src/display.cpp");
    create_file(&dir, "src/sensors.h");
    create_file(&dir, "lib/fmt/src/fmt.cc");
    create_file(&dir, "lib/fmt/src/os.cc");
    fs::write(
        dir.path().join("preflight.toml"),
        r#"
[project]
name = "weather-station"

[targets.esp32]
src_dirs = ["src", "lib"]
cxx_flags = ["-std=gnu++17"]
hooks = ["toolchain-compat"]
"#,
    )
    .unwrap();
    dir
}

fn run_preflight(dir: &TempDir, args: &[&str]) -> Output {
    let config = dir.path().join("preflight.toml");
    Command::new(env!("CARGO_BIN_EXE_preflight"))
        .arg("--config")
        .arg(&config)
        .args(args)
        // Keep tracing output away from the banner and report output
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to run preflight")
}

#[test]
fn configure_prints_banner_exactly_once() {
    let dir = demo_project();
    let output = run_preflight(&dir, &["configure", "--target", "esp32"]);

    assert!(
        output.status.success(),
        "Expected success exit code, got: {:?}",
        output.status
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.matches("Script running now!").count(),
        1,
        "Expected one banner in output: {}",
        stdout
    );
}

#[test]
fn configure_summary_shows_flags_and_exclusions() {
    let dir = demo_project();
    let output = run_preflight(&dir, &["configure", "--target", "esp32"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("-std=gnu++17 -Wno-register -Wno-reorder -Wno-deprecated-declarations"),
        "Expected seeded flags followed by suppressions: {}",
        stdout
    );
    assert!(
        stdout.contains("3 sources, 1 excluded"),
        "Expected source counts in output: {}",
        stdout
    );
    assert!(stdout.contains("fmt/src/fmt.cc"));
}

#[test]
fn configure_json_reports_flags_and_exclusions() {
    let dir = demo_project();
    let output = run_preflight(&dir, &["configure", "--target", "esp32", "--json"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    // The banner precedes the JSON array
    let json_start = stdout.find('[').expect("JSON array in output");
    let reports: serde_json::Value = serde_json::from_str(&stdout[json_start..]).unwrap();

    let report = &reports[0];
    assert_eq!(report["target"], "esp32");

    let cxx_flags = report["flags"]["cxx_flags"].as_array().unwrap();
    assert_eq!(cxx_flags.len(), 4);
    assert_eq!(cxx_flags[0], "-std=gnu++17");
    assert_eq!(cxx_flags[3], "-Wno-deprecated-declarations");

    let excluded = report["excluded"].as_array().unwrap();
    assert_eq!(excluded.len(), 1);
    assert!(excluded[0].as_str().unwrap().ends_with("fmt/src/fmt.cc"));
}

#[test]
fn configure_all_runs_each_target() {
    let dir = demo_project();
    fs::write(
        dir.path().join("preflight.toml"),
        r#"
[targets.esp32]
src_dirs = ["src"]
hooks = ["toolchain-compat"]

[targets.native]
src_dirs = ["src"]
hooks = ["toolchain-compat"]
"#,
    )
    .unwrap();

    let output = run_preflight(&dir, &["configure"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Script running now!").count(), 2);
    assert!(stdout.contains("Target: esp32"));
    assert!(stdout.contains("Target: native"));
}

#[test]
fn configure_unknown_target_fails() {
    let dir = demo_project();
    let output = run_preflight(&dir, &["configure", "--target", "teensy"]);

    assert!(!output.status.success(), "Expected failure exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown target: teensy"),
        "Expected error on stderr: {}",
        stderr
    );
}

#[test]
fn targets_command_lists_targets() {
    let dir = demo_project();
    let output = run_preflight(&dir, &["targets"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("esp32 (2 source dirs)"));
}

#[test]
fn help_lists_commands() {
    let dir = demo_project();
    let output = run_preflight(&dir, &["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("configure"));
    assert!(stdout.contains("targets"));
}
