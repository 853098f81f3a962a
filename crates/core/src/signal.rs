// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry signal kinds.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// One of the three OTLP telemetry categories.
///
/// Each signal has its own rotation state, file family, and request counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Traces,
    Logs,
    Metrics,
}

crate::simple_display! {
    Signal {
        Traces => "traces",
        Logs => "logs",
        Metrics => "metrics",
    }
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Traces, Signal::Logs, Signal::Metrics];

    /// File-name prefix and URL segment for this signal.
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Traces => "traces",
            Signal::Logs => "logs",
            Signal::Metrics => "metrics",
        }
    }

    /// Dense index for per-signal arrays.
    pub fn index(self) -> usize {
        match self {
            Signal::Traces => 0,
            Signal::Logs => 1,
            Signal::Metrics => 2,
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown signal: {0}")]
pub struct ParseSignalError(String);

impl FromStr for Signal {
    type Err = ParseSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traces" => Ok(Signal::Traces),
            "logs" => Ok(Signal::Logs),
            "metrics" => Ok(Signal::Metrics),
            other => Err(ParseSignalError(other.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
