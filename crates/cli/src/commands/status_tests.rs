// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use otelbox_core::{HealthStatus, StatsSnapshot};
use otelbox_wire::{FileEntry, HealthSnapshot};

use super::*;

fn sample() -> StatusResponse {
    StatusResponse {
        service: "otelbox".to_string(),
        version: otelbox_wire::VERSION.to_string(),
        pid: 4242,
        port: 4318,
        output_dir: PathBuf::from("/var/telemetry"),
        uptime_secs: 125,
        health: HealthSnapshot {
            status: HealthStatus::Healthy,
            consecutive_errors: 0,
            recent_errors: Vec::new(),
        },
        stats: StatsSnapshot { traces_received: 3, logs_received: 1, metrics_received: 0 },
        files: vec![FileEntry {
            signal: Signal::Traces,
            path: PathBuf::from("/var/telemetry/traces.20260101_000000_000.ndjson"),
        }],
    }
}

#[test]
fn renders_summary_and_files() {
    let text = render(&sample());
    assert!(text.starts_with("otelbox "));
    assert!(text.contains("on port 4318 (pid 4242)"));
    assert!(text.contains("Health:   healthy\n"));
    assert!(text.contains("Uptime:   2m 5s"));
    assert!(text.contains("Received: traces 3, logs 1, metrics 0"));
    assert!(text.contains("  traces   /var/telemetry/traces.20260101_000000_000.ndjson"));
    assert!(!text.contains("logs     /"));
    assert!(!text.contains("Recent errors"));
    assert!(!text.contains("Warning"));
}

#[test]
fn renders_degraded_health_with_errors() {
    let mut status = sample();
    status.health = HealthSnapshot {
        status: HealthStatus::Degraded,
        consecutive_errors: 10,
        recent_errors: vec!["disk full".to_string()],
    };
    let text = render(&status);
    assert!(text.contains("Health:   degraded (10 consecutive write errors)"));
    assert!(text.contains("Recent errors:\n  disk full\n"));
}

#[test]
fn warns_about_incompatible_versions() {
    let mut status = sample();
    status.version = "0.0.9".to_string();
    assert!(render(&status).contains("Warning: this CLI is"));
}
