// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lenient deserializers for the protobuf JSON mapping.

use serde::{Deserialize, Deserializer, Serializer};

/// Treat an explicit `null` the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum IntOrName {
    Int(i64),
    Name(String),
}

/// Resolve a protobuf enum given as number or name.
///
/// `names` maps protobuf enum names to values; unknown names resolve to 0.
pub(crate) fn enum_value<'de, D>(d: D, names: &[(&str, i32)]) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<IntOrName>::deserialize(d)? {
        None => 0,
        Some(IntOrName::Int(n)) => i32::try_from(n).unwrap_or(0),
        Some(IntOrName::Name(name)) => {
            names.iter().find(|(n, _)| *n == name).map(|(_, v)| *v).unwrap_or(0)
        }
    })
}

/// `fixed64`/`uint64` fields: string on the wire, number accepted.
pub(crate) mod u64_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Str(String),
        }
        match Option::<Raw>::deserialize(d)? {
            None => Ok(0),
            Some(Raw::Num(n)) => Ok(n),
            Some(Raw::Str(s)) if s.is_empty() => Ok(0),
            Some(Raw::Str(s)) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// `int64` fields: string on the wire, number accepted.
pub(crate) mod i64_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &i64, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Str(String),
        }
        match Raw::deserialize(d)? {
            Raw::Num(n) => Ok(n),
            Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// `double` fields: number, or the string forms `"NaN"`, `"Infinity"`,
/// `"-Infinity"` and decimal strings. Non-finite values serialize as strings.
pub(crate) mod f64_lenient {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            s.serialize_str("NaN")
        } else if value.is_infinite() {
            s.serialize_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            s.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Str(String),
        }
        match Raw::deserialize(d)? {
            Raw::Num(n) => Ok(n),
            Raw::Str(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => other.parse().map_err(serde::de::Error::custom),
            },
        }
    }
}

pub(crate) fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

pub(crate) fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

pub(crate) fn is_zero_i32(v: &i32) -> bool {
    *v == 0
}
