//! CLI tests for `stlaunch doctor`, `clean` and configuration errors.
//!
//! Spawns the stlaunch binary against scratch app directories with a controlled PATH.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

const CONFIG_KEYS: &[&str] = &[
    "STLAUNCH_APP_DIR",
    "STLAUNCH_PORT",
    "STLAUNCH_ENTRY",
    "STLAUNCH_HEADLESS",
    "STLAUNCH_RUNNER",
    "STLAUNCH_VENV_DIR",
    "STLAUNCH_REQUIREMENTS",
    "STLAUNCH_FALLBACK_PACKAGES",
    "STLAUNCH_PYTHON",
    "STLAUNCH_READINESS",
    "STLAUNCH_AUDIT_LOG",
    "RUST_LOG",
];

fn app_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("Home.py"), "import streamlit as st\n").expect("write entry");
    dir
}

fn stlaunch(app: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stlaunch"));
    for key in CONFIG_KEYS {
        cmd.env_remove(key);
    }
    cmd.env("PATH", app.join("no-such-bin")).current_dir(app);
    cmd
}

fn doctor_json(app: &Path) -> Value {
    let output = stlaunch(app)
        .args(["doctor", "--json"])
        .output()
        .expect("stlaunch doctor");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("doctor json")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn doctor_reports_fresh_app() {
    let app = app_dir();
    let report = doctor_json(app.path());

    assert_eq!(report["venv"]["exists"], false);
    assert_eq!(report["venv"]["activated"], false);
    assert_eq!(report["readiness"]["mode"], "path");
    assert_eq!(report["readiness"]["ready"], false);
    assert_eq!(report["dependencies"]["source"], "fallback");
    assert_eq!(report["dependencies"]["spec"], "streamlit pillow");
    assert_eq!(report["entry"]["exists"], true);
    assert_eq!(report["launch"]["cmd"], "streamlit");
    assert_eq!(
        report["launch"]["args"],
        serde_json::json!([
            "run",
            "Home.py",
            "--server.port",
            "8501",
            "--server.headless",
            "true"
        ])
    );
    assert!(!app.path().join(".venv").exists());
}

#[test]
fn doctor_prefers_manifest() {
    let app = app_dir();
    std::fs::write(app.path().join("requirements.txt"), "streamlit\npillow\n").unwrap();
    let report = doctor_json(app.path());
    assert_eq!(report["dependencies"]["source"], "manifest");
    assert!(report["dependencies"]["spec"]
        .as_str()
        .unwrap()
        .ends_with("requirements.txt"));
}

#[test]
fn doctor_reads_dotenv_and_flags_override_it() {
    let app = app_dir();
    std::fs::write(app.path().join(".env"), "STLAUNCH_PORT=9000\nSTLAUNCH_ENTRY=Home.py\n").unwrap();
    let report = doctor_json(app.path());
    assert_eq!(report["launch"]["args"][3], "9000");

    let output = stlaunch(app.path())
        .args(["doctor", "--json", "--port", "9100"])
        .output()
        .expect("stlaunch doctor");
    let report: Value = serde_json::from_slice(&output.stdout).expect("doctor json");
    assert_eq!(report["launch"]["args"][3], "9100");
}

#[test]
fn app_dir_flag_is_resolved_from_any_cwd() {
    let app = app_dir();
    let elsewhere = tempfile::tempdir().unwrap();
    let output = stlaunch(elsewhere.path())
        .args(["doctor", "--json", "--app-dir"])
        .arg(app.path())
        .output()
        .expect("stlaunch doctor");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["entry"]["exists"], true);
}

#[test]
fn invalid_port_in_env_exits_with_failure() {
    let app = app_dir();
    let output = stlaunch(app.path())
        .env("STLAUNCH_PORT", "not-a-port")
        .arg("doctor")
        .output()
        .expect("stlaunch doctor");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("not-a-port"));
}

#[test]
fn missing_app_dir_exits_with_failure() {
    let app = app_dir();
    let output = stlaunch(app.path())
        .args(["doctor", "--app-dir", "does-not-exist"])
        .output()
        .expect("stlaunch doctor");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn setup_without_interpreter_exits_127() {
    let app = app_dir();
    let output = stlaunch(app.path())
        .arg("setup")
        .output()
        .expect("stlaunch setup");
    assert_eq!(output.status.code(), Some(127));
    assert!(stderr(&output).contains("no Python interpreter"));
}

#[test]
fn clean_dry_run_then_force() {
    let app = app_dir();
    let venv = app.path().join(".venv");
    std::fs::create_dir_all(venv.join("bin")).unwrap();
    std::fs::write(venv.join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();

    let status = stlaunch(app.path())
        .args(["clean", "--dry-run"])
        .status()
        .expect("stlaunch clean");
    assert!(status.success());
    assert!(venv.exists());

    let status = stlaunch(app.path())
        .args(["clean", "--force"])
        .status()
        .expect("stlaunch clean");
    assert!(status.success());
    assert!(!venv.exists());
}
