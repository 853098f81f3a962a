// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `otelbox status`

use anyhow::Result;
use otelbox_core::Signal;
use otelbox_wire::StatusResponse;

use crate::client::ControlClient;
use crate::exit_error::{self, ExitError};
use crate::lifecycle::Lifecycle;
use crate::output::{format_or_json, format_uptime, OutputFormat};
use crate::port::resolve_port;

pub async fn status(port: Option<u16>, format: OutputFormat) -> Result<()> {
    let lifecycle = Lifecycle::system();
    let port = resolve_port(port, &lifecycle.registry().get_registered_entries())
        .map_err(ExitError::from)?;

    let status = match lifecycle.client().status(port).await {
        Ok(status) => status,
        Err(e) if e.is_not_running() => {
            let obj = serde_json::json!({ "status": "not_running", "port": port });
            format_or_json(format, &obj, || {
                eprintln!("no otelbox instance on port {}", port);
            })?;
            return Err(ExitError::silent(exit_error::USER).into());
        }
        Err(e) => return Err(ExitError::system(e.to_string()).into()),
    };

    format_or_json(format, &status, || print!("{}", render(&status)))?;
    if !status.is_healthy() {
        return Err(ExitError::silent(exit_error::USER).into());
    }
    Ok(())
}

pub(crate) fn render(status: &StatusResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} on port {} (pid {})\n",
        status.service, status.version, status.port, status.pid
    ));
    if !status.is_compatible() {
        out.push_str(&format!("Warning: this CLI is {}\n", otelbox_wire::VERSION));
    }
    out.push_str(&format!("Health:   {}", status.health.status));
    if status.health.consecutive_errors > 0 {
        out.push_str(&format!(
            " ({} consecutive write errors)",
            status.health.consecutive_errors
        ));
    }
    out.push('\n');
    out.push_str(&format!("Uptime:   {}\n", format_uptime(status.uptime_secs)));
    out.push_str(&format!("Output:   {}\n", status.output_dir.display()));
    out.push_str(&format!(
        "Received: traces {}, logs {}, metrics {}\n",
        status.stats.traces_received, status.stats.logs_received, status.stats.metrics_received
    ));

    let files: Vec<_> = Signal::ALL
        .iter()
        .filter_map(|signal| status.file_for(*signal).map(|path| (signal, path)))
        .collect();
    if !files.is_empty() {
        out.push_str("Files:\n");
        for (signal, path) in files {
            out.push_str(&format!("  {:<8} {}\n", signal.as_str(), path.display()));
        }
    }

    if !status.health.recent_errors.is_empty() {
        out.push_str("Recent errors:\n");
        for error in &status.health.recent_errors {
            out.push_str(&format!("  {}\n", error));
        }
    }
    out
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
