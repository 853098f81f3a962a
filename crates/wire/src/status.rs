// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status payload for `GET /api/status`.

use std::path::PathBuf;

use otelbox_core::{HealthStatus, Signal, StatsSnapshot};
use serde::{Deserialize, Serialize};

/// Everything a CLI needs to identify and judge a running receiver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    /// Always [`crate::SERVICE_NAME`] for otelbox receivers
    pub service: String,
    pub version: String,
    pub pid: u32,
    pub port: u16,
    /// Absolute output directory
    pub output_dir: PathBuf,
    pub uptime_secs: u64,
    pub health: HealthSnapshot,
    pub stats: StatsSnapshot,
    /// Active file per signal; absent until the signal's first write
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl StatusResponse {
    pub fn is_healthy(&self) -> bool {
        self.health.status == HealthStatus::Healthy
    }

    /// Same service and the same `major.minor` as this build.
    pub fn is_compatible(&self) -> bool {
        crate::is_compatible(&self.service, &self.version)
    }

    pub fn file_for(&self, signal: Signal) -> Option<&PathBuf> {
        self.files.iter().find(|f| f.signal == signal).map(|f| &f.path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub consecutive_errors: u32,
    /// Oldest first
    #[serde(default)]
    pub recent_errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    pub signal: Signal,
    pub path: PathBuf,
}
