// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the receiver and CLI.

use std::path::PathBuf;
use std::time::Duration;

pub const PORT: &str = "OTELBOX_PORT";
pub const OUTPUT_DIR: &str = "OTELBOX_OUTPUT_DIR";
pub const MAX_FILE_SIZE_MB: &str = "OTELBOX_MAX_FILE_SIZE_MB";
pub const MAX_CONSECUTIVE_FILE_ERRORS: &str = "OTELBOX_MAX_CONSECUTIVE_FILE_ERRORS";
pub const MAX_ERROR_HISTORY: &str = "OTELBOX_MAX_ERROR_HISTORY";
pub const PRETTY_JSON: &str = "OTELBOX_PRETTY_JSON";

/// Set on a receiver spawned by `otelbox start --daemon`.
pub const DETACHED: &str = "OTELBOX_DETACHED";

/// Raw value of a configuration variable, ignoring empty strings.
pub fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Resolve state directory: OTELBOX_STATE_DIR > XDG_STATE_HOME/otelbox >
/// platform state dir > platform local data dir > temp dir
pub fn state_dir() -> PathBuf {
    if let Some(dir) = var("OTELBOX_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("otelbox");
    }
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("otelbox")
}

/// Directory holding the instance registry: OTELBOX_REGISTRY_DIR > runtime
/// dir > temp dir
pub fn registry_dir() -> PathBuf {
    if let Some(dir) = var("OTELBOX_REGISTRY_DIR") {
        return PathBuf::from(dir);
    }
    dirs::runtime_dir().unwrap_or_else(std::env::temp_dir).join("otelbox")
}

/// Daily-rolled receiver log, written in daemon mode.
pub fn log_path() -> PathBuf {
    state_dir().join("logs").join("otelbox.log")
}

/// Whether this process was spawned as a detached receiver.
pub fn is_detached() -> bool {
    var(DETACHED).is_some_and(|v| v != "0")
}

/// Stdout/stderr of a detached receiver, for output before logging is up.
pub fn startup_log_path() -> PathBuf {
    state_dir().join("logs").join("startup.log")
}

/// How long `start --daemon` waits for the child to answer (default 10s).
pub fn startup_timeout() -> Duration {
    duration_ms("OTELBOX_STARTUP_TIMEOUT_MS").unwrap_or(Duration::from_secs(10))
}

/// How long `stop` waits for a graceful exit before escalating (default 10s).
pub fn shutdown_timeout() -> Duration {
    duration_ms("OTELBOX_SHUTDOWN_TIMEOUT_MS").unwrap_or(Duration::from_secs(10))
}

/// How long to wait for a force-killed process to disappear (default 5s).
pub fn kill_timeout() -> Duration {
    duration_ms("OTELBOX_KILL_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// Control-API request timeout (default 5s).
pub fn control_timeout() -> Duration {
    duration_ms("OTELBOX_CONTROL_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

fn duration_ms(name: &str) -> Option<Duration> {
    var(name).and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}
