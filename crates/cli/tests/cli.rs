// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests against the built `otelbox` binary.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;
use std::time::Duration;

use assert_cmd::Command;
use tempfile::TempDir;

const REGISTRY_FILE: &str = "otelbox-instances.json";

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    fn registry_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("run")
    }

    fn otelbox(&self) -> Command {
        let mut cmd = Command::cargo_bin("otelbox").unwrap();
        cmd.current_dir(self.dir.path())
            .env("OTELBOX_REGISTRY_DIR", self.registry_dir())
            .env("OTELBOX_STATE_DIR", self.dir.path().join("state"))
            .env("OTELBOX_CONTROL_TIMEOUT_MS", "2000")
            .env_remove("OTELBOX_PORT")
            .env_remove("OTELBOX_OUTPUT_DIR")
            .env_remove("OTELBOX_DETACHED")
            .env_remove("RUST_LOG")
            .timeout(Duration::from_secs(60));
        cmd
    }

    /// A registry entry whose pid is this test process, which is not otelbox.
    fn write_stale_entry(&self, port: u16) {
        std::fs::create_dir_all(self.registry_dir()).unwrap();
        let entries = serde_json::json!([{
            "pid": std::process::id(),
            "port": port,
            "timestamp": "2026-01-01T00:00:00Z",
        }]);
        std::fs::write(self.registry_dir().join(REGISTRY_FILE), entries.to_string()).unwrap();
    }
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

#[test]
fn version_includes_package_version() {
    let output = Env::new().otelbox().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn instances_with_empty_registry() {
    let env = Env::new();
    let output = env.otelbox().arg("instances").output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("No otelbox instances registered."));

    let output = env.otelbox().args(["instances", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows, serde_json::json!([]));
}

#[test]
fn instances_marks_stale_entries() {
    let env = Env::new();
    env.write_stale_entry(4999);

    let output = env.otelbox().args(["instances", "--format", "json"]).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows[0]["port"], 4999);
    assert_eq!(rows[0]["running"], false);
}

#[test]
fn clean_removes_stale_entries_and_the_file() {
    let env = Env::new();
    env.write_stale_entry(4999);

    let output = env.otelbox().arg("clean").output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Removed 1 stale entry"));
    assert!(!env.registry_dir().join(REGISTRY_FILE).exists());

    let output = env.otelbox().args(["clean", "--format", "json"]).output().unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["removed"], 0);
}

#[test]
fn status_without_instances_is_exit_1() {
    let output = Env::new().otelbox().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no running otelbox instance"), "{}", stderr(&output));
}

#[test]
fn status_on_closed_port_is_exit_1() {
    let port = free_port().to_string();
    let output = Env::new().otelbox().args(["status", "--port", &port]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(&format!("no otelbox instance on port {port}")));
}

#[test]
fn stop_with_nothing_running_is_exit_1() {
    let port = free_port().to_string();
    let output = Env::new().otelbox().args(["stop", "--port", &port]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn ambiguous_registry_needs_explicit_port() {
    let env = Env::new();
    std::fs::create_dir_all(env.registry_dir()).unwrap();
    let entries = serde_json::json!([
        {"pid": std::process::id(), "port": 4998, "timestamp": "2026-01-01T00:00:00Z"},
        {"pid": std::process::id(), "port": 4999, "timestamp": "2026-01-01T00:00:00Z"},
    ]);
    std::fs::write(env.registry_dir().join(REGISTRY_FILE), entries.to_string()).unwrap();

    let output = env.otelbox().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("4998, 4999"), "{}", stderr(&output));
}

#[test]
fn invalid_start_config_is_exit_1() {
    let port = free_port().to_string();
    let output = Env::new()
        .otelbox()
        .args(["start", "--port", &port, "--max-file-size-mb", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("max_file_size_mb"), "{}", stderr(&output));
}

#[cfg(unix)]
#[test]
fn daemon_start_status_stop_round_trip() {
    let env = Env::new();
    let port = free_port().to_string();

    let output = env
        .otelbox()
        .args(["start", "--daemon", "--port", &port, "--output-dir", "out"])
        .output()
        .unwrap();
    assert!(output.status.success(), "start: {}", stderr(&output));
    assert!(stdout(&output).contains(&format!("otelbox started on port {port}")));

    // Exactly one instance registered, so no --port needed
    let output = env.otelbox().args(["status", "--format", "json"]).output().unwrap();
    assert!(output.status.success(), "status: {}", stderr(&output));
    let status: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(status["port"].to_string(), port);
    assert_eq!(status["health"]["status"], "healthy");
    assert_eq!(
        Path::new(status["output_dir"].as_str().unwrap()).file_name().unwrap(),
        "out"
    );

    // A second start on the same port is refused
    let output = env
        .otelbox()
        .args(["start", "--daemon", "--port", &port, "--output-dir", "out"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("already running"), "{}", stderr(&output));

    let output = env.otelbox().arg("stop").output().unwrap();
    assert!(output.status.success(), "stop: {}", stderr(&output));
    assert!(!env.registry_dir().join(REGISTRY_FILE).exists());
}
