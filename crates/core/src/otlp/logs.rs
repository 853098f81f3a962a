// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log export payloads.

use super::common::{AnyValue, InstrumentationScope, KeyValue, Resource};
use super::serde_helpers::{
    enum_value, is_zero_i32, is_zero_u32, is_zero_u64, null_as_default, u64_string,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /v1/logs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_logs: Vec<ResourceLogs>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLogs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope_logs: Vec<ScopeLogs>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub schema_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeLogs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<InstrumentationScope>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub log_records: Vec<LogRecord>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub schema_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    #[serde(default, with = "u64_string", skip_serializing_if = "is_zero_u64")]
    pub time_unix_nano: u64,
    #[serde(default, with = "u64_string", skip_serializing_if = "is_zero_u64")]
    pub observed_time_unix_nano: u64,
    #[serde(default, deserialize_with = "severity_number", skip_serializing_if = "is_zero_i32")]
    pub severity_number: i32,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub severity_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<AnyValue>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub dropped_attributes_count: u32,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub flags: u32,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub span_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Severity numbers from the OpenTelemetry log data model.
pub mod severity {
    pub const UNSPECIFIED: i32 = 0;
    pub const TRACE: i32 = 1;
    pub const DEBUG: i32 = 5;
    pub const INFO: i32 = 9;
    pub const WARN: i32 = 13;
    pub const ERROR: i32 = 17;
    pub const FATAL: i32 = 21;
}

const SEVERITY_NAMES: &[(&str, i32)] = &[
    ("SEVERITY_NUMBER_UNSPECIFIED", 0),
    ("SEVERITY_NUMBER_TRACE", 1),
    ("SEVERITY_NUMBER_TRACE2", 2),
    ("SEVERITY_NUMBER_TRACE3", 3),
    ("SEVERITY_NUMBER_TRACE4", 4),
    ("SEVERITY_NUMBER_DEBUG", 5),
    ("SEVERITY_NUMBER_DEBUG2", 6),
    ("SEVERITY_NUMBER_DEBUG3", 7),
    ("SEVERITY_NUMBER_DEBUG4", 8),
    ("SEVERITY_NUMBER_INFO", 9),
    ("SEVERITY_NUMBER_INFO2", 10),
    ("SEVERITY_NUMBER_INFO3", 11),
    ("SEVERITY_NUMBER_INFO4", 12),
    ("SEVERITY_NUMBER_WARN", 13),
    ("SEVERITY_NUMBER_WARN2", 14),
    ("SEVERITY_NUMBER_WARN3", 15),
    ("SEVERITY_NUMBER_WARN4", 16),
    ("SEVERITY_NUMBER_ERROR", 17),
    ("SEVERITY_NUMBER_ERROR2", 18),
    ("SEVERITY_NUMBER_ERROR3", 19),
    ("SEVERITY_NUMBER_ERROR4", 20),
    ("SEVERITY_NUMBER_FATAL", 21),
    ("SEVERITY_NUMBER_FATAL2", 22),
    ("SEVERITY_NUMBER_FATAL3", 23),
    ("SEVERITY_NUMBER_FATAL4", 24),
];

fn severity_number<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    enum_value(d, SEVERITY_NAMES)
}
