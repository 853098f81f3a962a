// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Types shared by all three signals: attributes, resources, scopes.

use super::serde_helpers::{f64_lenient, i64_string, is_zero_u32, null_as_default};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// An attribute or log body value.
///
/// `{}` is a valid value with nothing set and decodes as [`AnyValue::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnyValue {
    StringValue(String),
    BoolValue(bool),
    IntValue(i64),
    DoubleValue(f64),
    ArrayValue(ArrayValue),
    KvlistValue(KeyValueList),
    /// Base64 as produced by the protobuf JSON mapping
    BytesValue(String),
    Empty,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnyValueFields {
    string_value: Option<String>,
    bool_value: Option<bool>,
    #[serde(default, deserialize_with = "int_value")]
    int_value: Option<i64>,
    #[serde(default, deserialize_with = "double_value")]
    double_value: Option<f64>,
    array_value: Option<ArrayValue>,
    kvlist_value: Option<KeyValueList>,
    bytes_value: Option<String>,
}

fn int_value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Option::<Value>::deserialize(d)?
        .map(|v| i64_string::deserialize(v).map_err(serde::de::Error::custom))
        .transpose()
}

fn double_value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Option::<Value>::deserialize(d)?
        .map(|v| f64_lenient::deserialize(v).map_err(serde::de::Error::custom))
        .transpose()
}

impl<'de> Deserialize<'de> for AnyValue {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let f = AnyValueFields::deserialize(d)?;
        let value = f
            .string_value
            .map(AnyValue::StringValue)
            .or(f.bool_value.map(AnyValue::BoolValue))
            .or(f.int_value.map(AnyValue::IntValue))
            .or(f.double_value.map(AnyValue::DoubleValue))
            .or(f.array_value.map(AnyValue::ArrayValue))
            .or(f.kvlist_value.map(AnyValue::KvlistValue))
            .or(f.bytes_value.map(AnyValue::BytesValue));
        Ok(value.unwrap_or(AnyValue::Empty))
    }
}

struct Double(f64);

impl Serialize for Double {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        f64_lenient::serialize(&self.0, s)
    }
}

impl Serialize for AnyValue {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let len = usize::from(!matches!(self, AnyValue::Empty));
        let mut map = s.serialize_map(Some(len))?;
        match self {
            AnyValue::StringValue(v) => map.serialize_entry("stringValue", v)?,
            AnyValue::BoolValue(v) => map.serialize_entry("boolValue", v)?,
            AnyValue::IntValue(v) => map.serialize_entry("intValue", &v.to_string())?,
            AnyValue::DoubleValue(v) => map.serialize_entry("doubleValue", &Double(*v))?,
            AnyValue::ArrayValue(v) => map.serialize_entry("arrayValue", v)?,
            AnyValue::KvlistValue(v) => map.serialize_entry("kvlistValue", v)?,
            AnyValue::BytesValue(v) => map.serialize_entry("bytesValue", v)?,
            AnyValue::Empty => {}
        }
        map.end()
    }
}

impl AnyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnyValue::StringValue(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AnyValue {
    fn from(s: &str) -> Self {
        AnyValue::StringValue(s.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<AnyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValueList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AnyValue>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<AnyValue>) -> Self {
        Self { key: key.into(), value: Some(value.into()) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub dropped_attributes_count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationScope {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero_u32")]
    pub dropped_attributes_count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
