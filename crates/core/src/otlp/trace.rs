// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trace export payloads.

use super::common::{InstrumentationScope, KeyValue, Resource};
use super::serde_helpers::{enum_value, is_zero_i32, is_zero_u32, is_zero_u64, null_as_default, u64_string};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Body of `POST /v1/traces`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracesData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_spans: Vec<ResourceSpans>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpans {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope_spans: Vec<ScopeSpans>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub schema_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSpans {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<InstrumentationScope>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<Span>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub schema_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    #[serde(default, deserialize_with = "null_as_default")]
    pub trace_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub span_id: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub trace_state: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub parent_span_id: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub flags: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "SpanKind::is_unspecified")]
    pub kind: SpanKind,
    #[serde(default, with = "u64_string")]
    pub start_time_unix_nano: u64,
    #[serde(default, with = "u64_string")]
    pub end_time_unix_nano: u64,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub dropped_attributes_count: u32,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SpanEvent>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub dropped_events_count: u32,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<SpanLink>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub dropped_links_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEvent {
    #[serde(default, with = "u64_string", skip_serializing_if = "is_zero_u64")]
    pub time_unix_nano: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub dropped_attributes_count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanLink {
    #[serde(default, deserialize_with = "null_as_default")]
    pub trace_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub span_id: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub trace_state: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub dropped_attributes_count: u32,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub flags: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default)]
    pub code: StatusCode,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Span status code. An absent status is `Unset`, which is not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusCode {
    #[default]
    Unset,
    Ok,
    Error,
}

const STATUS_CODE_NAMES: &[(&str, i32)] =
    &[("STATUS_CODE_UNSET", 0), ("STATUS_CODE_OK", 1), ("STATUS_CODE_ERROR", 2)];

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i32(match self {
            StatusCode::Unset => 0,
            StatusCode::Ok => 1,
            StatusCode::Error => 2,
        })
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match enum_value(d, STATUS_CODE_NAMES)? {
            1 => StatusCode::Ok,
            2 => StatusCode::Error,
            _ => StatusCode::Unset,
        })
    }
}

/// Span kind, kept numeric so unknown values survive a round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SpanKind(pub i32);

const SPAN_KIND_NAMES: &[(&str, i32)] = &[
    ("SPAN_KIND_UNSPECIFIED", 0),
    ("SPAN_KIND_INTERNAL", 1),
    ("SPAN_KIND_SERVER", 2),
    ("SPAN_KIND_CLIENT", 3),
    ("SPAN_KIND_PRODUCER", 4),
    ("SPAN_KIND_CONSUMER", 5),
];

impl SpanKind {
    pub const INTERNAL: SpanKind = SpanKind(1);
    pub const SERVER: SpanKind = SpanKind(2);
    pub const CLIENT: SpanKind = SpanKind(3);

    fn is_unspecified(&self) -> bool {
        is_zero_i32(&self.0)
    }
}

impl<'de> Deserialize<'de> for SpanKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        enum_value(d, SPAN_KIND_NAMES).map(SpanKind)
    }
}
