#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

const FAKE_CMAKE: &str = r#"#!/bin/sh
printf '%s\n' "$@" >> "$CMAKEW_ARGS_OUT"
echo "--" >> "$CMAKEW_ARGS_OUT"
exit "${FAKE_CMAKE_EXIT:-0}"
"#;

fn cmakew(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cmakew"));
    cmd.current_dir(dir).env("RUST_LOG", "warn");
    cmd
}

fn install_fake_cmake(dir: &Path) -> PathBuf {
    let script = dir.join("fake-cmake");
    fs::write(&script, FAKE_CMAKE).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn write_config(dir: &Path, binary: &Path, toolchain: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join("cmakew.toml");
    fs::write(
        &path,
        format!(
            "[cmake]\nbinary = \"{}\"\n\n[project]\nconfiguration = \"RelWithDebInfo\"\nbuild_folder = \"out\"\ntoolchain = \"{toolchain}\"\n",
            binary.display()
        ),
    )
    .unwrap();
    path
}

fn recorded_invocations(path: &Path) -> Vec<Vec<String>> {
    let text = fs::read_to_string(path).unwrap();
    text.split("--\n")
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| chunk.lines().map(str::to_string).collect())
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn configure_then_build_against_fake_cmake() {
    let dir = tempfile::tempdir().unwrap();
    let script = install_fake_cmake(dir.path());
    // Config lives in a subdirectory; its relative paths still refer to the
    // directory cmake runs in.
    let config = write_config(&dir.path().join("ci"), &script, "/tc/file.cmake");
    let args_out = dir.path().join("args.txt");

    let status = cmakew(dir.path())
        .arg("configure")
        .arg("--config")
        .arg(&config)
        .arg("--verbose")
        .arg("--env")
        .arg(format!("CMAKEW_ARGS_OUT={}", args_out.display()))
        .status()
        .unwrap();
    assert!(status.success());

    let status = cmakew(dir.path())
        .args(["build", "--verbose", "--config"])
        .arg(&config)
        .env("CMAKEW_ARGS_OUT", &args_out)
        .status()
        .unwrap();
    assert!(status.success());

    let calls = recorded_invocations(&args_out);
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        strings(&[
            "-DCMAKE_EXPORT_COMPILE_COMMANDS=ON",
            "-DCMAKE_TOOLCHAIN_FILE=/tc/file.cmake",
            "-DENABLE_TESTING=ON",
            "-DCMAKE_BUILD_TYPE=RelWithDebInfo",
            "--log-level=TRACE",
            "-Wdev",
            "-S",
            ".",
            "-B",
            "out",
        ])
    );
    assert_eq!(calls[1], strings(&["--build", "out", "--verbose"]));

    let status = cmakew(dir.path())
        .args(["build", "--config"])
        .arg(&config)
        .env("CMAKEW_ARGS_OUT", &args_out)
        .env("FAKE_CMAKE_EXIT", "4")
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn build_of_unconfigured_folder_warns_and_still_runs_cmake() {
    let dir = tempfile::tempdir().unwrap();
    let script = install_fake_cmake(dir.path());
    let config = write_config(dir.path(), &script, "/tc/file.cmake");
    let args_out = dir.path().join("args.txt");

    let output = cmakew(dir.path())
        .args(["build", "--config"])
        .arg(&config)
        .env("CMAKEW_ARGS_OUT", &args_out)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not look configured"), "stderr: {stderr}");
    assert_eq!(
        recorded_invocations(&args_out),
        vec![strings(&["--build", "out"])]
    );
}

#[test]
fn doctor_reports_configured_binary_and_missing_pieces() {
    let dir = tempfile::tempdir().unwrap();
    let script = install_fake_cmake(dir.path());
    let config = write_config(dir.path(), &script, "missing.cmake");

    let output = cmakew(dir.path())
        .args(["doctor", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["cmake_binary"], script.display().to_string());
    assert_eq!(report["cmake_resolved"], script.display().to_string());
    assert_eq!(report["toolchain"], "missing.cmake");
    assert_eq!(report["toolchain_exists"], false);
    assert_eq!(report["build_folder"], "out");
    assert_eq!(report["build_folder_configured"], false);

    fs::create_dir_all(dir.path().join("out")).unwrap();
    fs::write(dir.path().join("out/CMakeCache.txt"), "").unwrap();
    fs::write(dir.path().join("missing.cmake"), "").unwrap();
    let output = cmakew(dir.path())
        .args(["doctor", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["toolchain_exists"], true);
    assert_eq!(report["build_folder_configured"], true);
}

#[test]
fn doctor_ignores_path_cmake_when_configured_binary_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    let path_cmake = bin.join("cmake");
    fs::write(&path_cmake, FAKE_CMAKE).unwrap();
    fs::set_permissions(&path_cmake, fs::Permissions::from_mode(0o755)).unwrap();
    let config = write_config(dir.path(), Path::new("/opt/missing/cmake"), "tc.cmake");

    let output = cmakew(dir.path())
        .args(["doctor", "--config"])
        .arg(&config)
        .env("PATH", &bin)
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["cmake_binary"], "/opt/missing/cmake");
    assert_eq!(report["cmake_resolved"], Value::Null);
}

#[test]
fn missing_cmake_binary_fails_with_a_single_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &dir.path().join("no-such-cmake"), "tc.cmake");
    fs::create_dir_all(dir.path().join("out")).unwrap();
    fs::write(dir.path().join("out/CMakeCache.txt"), "").unwrap();

    let output = cmakew(dir.path())
        .args(["build", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("failed to spawn").count(), 1, "stderr: {stderr}");
}
