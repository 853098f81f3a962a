// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-signal request counters.

use crate::Signal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Requests accepted per signal since the receiver started.
#[derive(Debug, Default)]
pub struct TelemetryStatistics {
    counters: [AtomicU64; 3],
}

impl TelemetryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, signal: Signal) {
        self.counters[signal.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, signal: Signal) -> u64 {
        self.counters[signal.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            traces_received: self.get(Signal::Traces),
            logs_received: self.get(Signal::Logs),
            metrics_received: self.get(Signal::Metrics),
        }
    }
}

/// Point-in-time copy of the counters, as reported by the control API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub traces_received: u64,
    pub logs_received: u64,
    pub metrics_received: u64,
}

impl StatsSnapshot {
    pub fn total(&self) -> u64 {
        self.traces_received + self.logs_received + self.metrics_received
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
