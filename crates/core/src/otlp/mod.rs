// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OTLP/JSON data model.
//!
//! Field names follow the protobuf JSON mapping (camelCase). Deserialization
//! is lenient: missing or `null` collections become empty, enum fields accept
//! either their numeric value or their protobuf name, and 64-bit integers
//! accept strings or numbers. Fields the model does not name are kept in each
//! message's `extra` map and written back unchanged. Serialization always
//! emits the canonical form (numeric enums, string-encoded 64-bit integers).

mod common;
mod logs;
mod metrics;
mod serde_helpers;
mod trace;

pub use common::{AnyValue, ArrayValue, InstrumentationScope, KeyValue, KeyValueList, Resource};
pub use logs::{severity, LogRecord, LogsData, ResourceLogs, ScopeLogs};
pub use metrics::{Metric, MetricsData, ResourceMetrics, ScopeMetrics};
pub use trace::{
    ResourceSpans, ScopeSpans, Span, SpanEvent, SpanKind, SpanLink, Status, StatusCode, TracesData,
};

use crate::Signal;
use serde::Serialize;

/// A decoded export request for one signal.
///
/// Serializes to exactly the inner payload, so a persisted line is the
/// OTLP/JSON export request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TelemetryBatch {
    Traces(TracesData),
    Logs(LogsData),
    Metrics(MetricsData),
}

impl TelemetryBatch {
    pub fn signal(&self) -> Signal {
        match self {
            TelemetryBatch::Traces(_) => Signal::Traces,
            TelemetryBatch::Logs(_) => Signal::Logs,
            TelemetryBatch::Metrics(_) => Signal::Metrics,
        }
    }

    /// Decode an OTLP/JSON request body for `signal`.
    pub fn from_json(signal: Signal, body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match signal {
            Signal::Traces => TelemetryBatch::Traces(serde_json::from_slice(body)?),
            Signal::Logs => TelemetryBatch::Logs(serde_json::from_slice(body)?),
            Signal::Metrics => TelemetryBatch::Metrics(serde_json::from_slice(body)?),
        })
    }

    /// Serialize to a single JSON document, compact or indented.
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl From<TracesData> for TelemetryBatch {
    fn from(data: TracesData) -> Self {
        TelemetryBatch::Traces(data)
    }
}

impl From<LogsData> for TelemetryBatch {
    fn from(data: LogsData) -> Self {
        TelemetryBatch::Logs(data)
    }
}

impl From<MetricsData> for TelemetryBatch {
    fn from(data: MetricsData) -> Self {
        TelemetryBatch::Metrics(data)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
