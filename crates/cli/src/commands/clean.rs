// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `otelbox clean`

use anyhow::Result;
use otelbox_daemon::PidFileService;

use crate::exit_error::ExitError;
use crate::output::{count, format_or_json, OutputFormat};

pub fn clean(format: OutputFormat) -> Result<()> {
    let registry = PidFileService::system();
    let removed = registry
        .clean_stale_entries()
        .map_err(|e| ExitError::system(format!("failed to clean registry: {e}")))?;

    let obj = serde_json::json!({
        "removed": removed,
        "registry": registry.path(),
    });
    format_or_json(format, &obj, || {
        println!("Removed {}", count(removed, "stale entry", "stale entries"));
    })
}
