// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::otlp::{
    AnyValue, InstrumentationScope, KeyValue, LogRecord, LogsData, Resource, ResourceLogs,
    ResourceSpans, ScopeLogs, ScopeSpans, Span, SpanEvent, SpanKind, Status, StatusCode,
    TelemetryBatch, TracesData,
};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for telemetry payloads.
pub mod strategies {
    use crate::otlp::StatusCode;
    use crate::Signal;
    use proptest::prelude::*;

    pub fn arb_signal() -> impl Strategy<Value = Signal> {
        prop_oneof![Just(Signal::Traces), Just(Signal::Logs), Just(Signal::Metrics)]
    }

    pub fn arb_status_code() -> impl Strategy<Value = StatusCode> {
        prop_oneof![Just(StatusCode::Unset), Just(StatusCode::Ok), Just(StatusCode::Error)]
    }

    pub fn arb_severity() -> impl Strategy<Value = i32> {
        0i32..=24
    }
}

// ── Batch builders ─────────────────────────────────────────────────────

fn resource(service: &str) -> Option<Resource> {
    Some(Resource {
        attributes: vec![KeyValue::new("service.name", service)],
        ..Default::default()
    })
}

fn scope() -> Option<InstrumentationScope> {
    Some(InstrumentationScope { name: "otelbox-tests".to_string(), ..Default::default() })
}

/// Builds a single-resource, single-scope trace batch.
#[derive(Debug, Clone, Default)]
pub struct TraceBatchBuilder {
    spans: Vec<Span>,
}

impl TraceBatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn span(mut self, name: &str, code: Option<StatusCode>) -> Self {
        let n = self.spans.len() as u64 + 1;
        self.spans.push(Span {
            trace_id: "5b8efff798038103d269b633813fc60c".to_string(),
            span_id: format!("{n:016x}"),
            name: name.to_string(),
            kind: SpanKind::INTERNAL,
            start_time_unix_nano: 1_767_225_600_000_000_000 + n * 1_000,
            end_time_unix_nano: 1_767_225_600_000_000_000 + n * 2_000,
            status: code.map(|code| Status { code, ..Default::default() }),
            ..Default::default()
        });
        self
    }

    pub fn ok_span(self, name: &str) -> Self {
        self.span(name, Some(StatusCode::Ok))
    }

    pub fn error_span(self, name: &str) -> Self {
        self.span(name, Some(StatusCode::Error))
    }

    pub fn unset_span(self, name: &str) -> Self {
        self.span(name, None)
    }

    /// An unset-status span carrying an `exception` event.
    pub fn exception_span(mut self, name: &str) -> Self {
        self = self.span(name, None);
        if let Some(span) = self.spans.last_mut() {
            span.events.push(SpanEvent {
                name: "exception".to_string(),
                attributes: vec![KeyValue::new("exception.type", "IOError")],
                ..Default::default()
            });
        }
        self
    }

    /// Attach a string attribute of `len` bytes to the last span.
    pub fn padding(mut self, len: usize) -> Self {
        if let Some(span) = self.spans.last_mut() {
            span.attributes.push(KeyValue {
                key: "padding".to_string(),
                value: Some(AnyValue::StringValue("x".repeat(len))),
            });
        }
        self
    }

    pub fn build_data(self) -> TracesData {
        TracesData {
            resource_spans: vec![ResourceSpans {
                resource: resource("checkout"),
                scope_spans: vec![ScopeSpans {
                    scope: scope(),
                    spans: self.spans,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub fn build(self) -> TelemetryBatch {
        TelemetryBatch::Traces(self.build_data())
    }
}

/// Builds a single-resource, single-scope log batch.
#[derive(Debug, Clone, Default)]
pub struct LogBatchBuilder {
    records: Vec<LogRecord>,
}

impl LogBatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, severity_number: i32, body: &str) -> Self {
        self.records.push(LogRecord {
            time_unix_nano: 1_767_225_600_000_000_000,
            severity_number,
            body: Some(AnyValue::from(body)),
            ..Default::default()
        });
        self
    }

    pub fn push(mut self, record: LogRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn build_data(self) -> LogsData {
        LogsData {
            resource_logs: vec![ResourceLogs {
                resource: resource("checkout"),
                scope_logs: vec![ScopeLogs {
                    scope: scope(),
                    log_records: self.records,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub fn build(self) -> TelemetryBatch {
        TelemetryBatch::Logs(self.build_data())
    }
}
