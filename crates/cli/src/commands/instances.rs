// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `otelbox instances`

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use otelbox_core::Clock;
use otelbox_daemon::{PidFileService, ProcessTable};
use serde::Serialize;

use crate::output::{handle_list, OutputFormat};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceRow {
    pub pid: u32,
    pub port: u16,
    pub registered_at: DateTime<Utc>,
    pub running: bool,
}

/// Every registry entry, with its current liveness.
pub fn rows<P: ProcessTable, C: Clock>(registry: &PidFileService<P, C>) -> Vec<InstanceRow> {
    registry
        .get_registered_entries()
        .into_iter()
        .map(|entry| InstanceRow {
            running: registry.is_running(&entry),
            pid: entry.pid,
            port: entry.port,
            registered_at: entry.timestamp,
        })
        .collect()
}

pub fn instances(format: OutputFormat) -> Result<()> {
    let rows = rows(&PidFileService::system());
    handle_list(format, &rows, "No otelbox instances registered.", |rows, out| {
        let _ = writeln!(out, "{:<8} {:<6} {:<20} STATE", "PID", "PORT", "REGISTERED");
        for row in rows {
            let _ = writeln!(
                out,
                "{:<8} {:<6} {:<20} {}",
                row.pid,
                row.port,
                row.registered_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                if row.running { "running" } else { "stale" }
            );
        }
        if rows.iter().any(|r| !r.running) {
            let _ = writeln!(out, "\nRun `otelbox clean` to remove stale entries.");
        }
    })
}

#[cfg(test)]
#[path = "instances_tests.rs"]
mod tests;
