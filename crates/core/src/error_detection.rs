// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classification of telemetry batches as error-bearing.
//!
//! A batch is flagged when any item anywhere in it matches; the checks are a
//! logical OR across every resource and scope. Empty collections at any level
//! simply contribute nothing.

use crate::otlp::{severity, LogRecord, LogsData, Span, StatusCode, TelemetryBatch, TracesData};

/// Span event name recorded for exceptions by OpenTelemetry SDKs.
pub const EXCEPTION_EVENT: &str = "exception";

/// Log attribute keys whose presence marks a record as an exception.
pub const EXCEPTION_ATTRIBUTE_KEYS: [&str; 3] =
    ["exception.type", "exception.message", "exception.stacktrace"];

/// Whether the batch should be mirrored into the error file.
///
/// Metric batches never carry errors.
pub fn contains_errors(batch: &TelemetryBatch) -> bool {
    match batch {
        TelemetryBatch::Traces(data) => traces_contain_errors(data),
        TelemetryBatch::Logs(data) => logs_contain_errors(data),
        TelemetryBatch::Metrics(_) => false,
    }
}

pub fn traces_contain_errors(data: &TracesData) -> bool {
    data.resource_spans
        .iter()
        .flat_map(|rs| &rs.scope_spans)
        .flat_map(|ss| &ss.spans)
        .any(span_is_error)
}

pub fn logs_contain_errors(data: &LogsData) -> bool {
    data.resource_logs
        .iter()
        .flat_map(|rl| &rl.scope_logs)
        .flat_map(|sl| &sl.log_records)
        .any(record_is_error)
}

fn span_is_error(span: &Span) -> bool {
    let status_error = span.status.as_ref().is_some_and(|s| s.code == StatusCode::Error);
    status_error || span.events.iter().any(|e| e.name == EXCEPTION_EVENT)
}

fn record_is_error(record: &LogRecord) -> bool {
    record.severity_number >= severity::ERROR
        || record.attributes.iter().any(|kv| EXCEPTION_ATTRIBUTE_KEYS.contains(&kv.key.as_str()))
}

#[cfg(test)]
#[path = "error_detection_tests.rs"]
mod tests;
