// SPDX-License-Identifier: PMPL-1.0-or-later
//! Type mapping between Rust field types and remote schema data types.
//!
//! Rust types describe themselves through [`FieldType`]; the runtime form of
//! that description is a [`HostType`]. A single table ([`TYPE_TABLE`]) maps
//! host types to remote [`DataType`]s in both directions.
//!
//! Only `T` and `Option<T>` are valid field types. Nested options and richer
//! unions do not implement [`FieldType`], so they are rejected at compile time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ModelError, Result};

/// Scalar kinds shared by host types and remote data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Text,
    Int,
    Number,
    Boolean,
    Uuid,
}

/// Runtime description of a Rust field type (optionality stripped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    Scalar(ScalarType),
    Array(ScalarType),
}

/// A primitive remote data type, e.g. `text` or `int[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Text,
    TextArray,
    Int,
    IntArray,
    Number,
    NumberArray,
    Boolean,
    BooleanArray,
    Uuid,
    UuidArray,
}

/// Bidirectional host/remote mapping. Every row round-trips.
pub const TYPE_TABLE: &[(HostType, DataType)] = &[
    (HostType::Scalar(ScalarType::Text), DataType::Text),
    (HostType::Array(ScalarType::Text), DataType::TextArray),
    (HostType::Scalar(ScalarType::Int), DataType::Int),
    (HostType::Array(ScalarType::Int), DataType::IntArray),
    (HostType::Scalar(ScalarType::Number), DataType::Number),
    (HostType::Array(ScalarType::Number), DataType::NumberArray),
    (HostType::Scalar(ScalarType::Boolean), DataType::Boolean),
    (HostType::Array(ScalarType::Boolean), DataType::BooleanArray),
    (HostType::Scalar(ScalarType::Uuid), DataType::Uuid),
    (HostType::Array(ScalarType::Uuid), DataType::UuidArray),
];

/// Map a host type to its remote data type.
pub fn to_remote_type(host: HostType) -> Result<DataType> {
    TYPE_TABLE
        .iter()
        .find(|(h, _)| *h == host)
        .map(|(_, d)| *d)
        .ok_or_else(|| ModelError::UnsupportedType(format!("{host:?}")))
}

/// Map a remote data type back to its host type.
pub fn to_host_type(data_type: DataType) -> Result<HostType> {
    TYPE_TABLE
        .iter()
        .find(|(_, d)| *d == data_type)
        .map(|(h, _)| *h)
        .ok_or_else(|| ModelError::UnsupportedType(data_type.to_string()))
}

impl DataType {
    /// The name used in `dataType` arrays of the remote schema.
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::TextArray => "text[]",
            DataType::Int => "int",
            DataType::IntArray => "int[]",
            DataType::Number => "number",
            DataType::NumberArray => "number[]",
            DataType::Boolean => "boolean",
            DataType::BooleanArray => "boolean[]",
            DataType::Uuid => "uuid",
            DataType::UuidArray => "uuid[]",
        }
    }

    /// Parse a remote data type name.
    ///
    /// The deprecated `string` type reads as `text`; it is never emitted.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "text" | "string" => Ok(DataType::Text),
            "text[]" | "string[]" => Ok(DataType::TextArray),
            "int" => Ok(DataType::Int),
            "int[]" => Ok(DataType::IntArray),
            "number" => Ok(DataType::Number),
            "number[]" => Ok(DataType::NumberArray),
            "boolean" => Ok(DataType::Boolean),
            "boolean[]" => Ok(DataType::BooleanArray),
            "uuid" => Ok(DataType::Uuid),
            "uuid[]" => Ok(DataType::UuidArray),
            other => Err(ModelError::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        DataType::parse(s)
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        DataType::parse(&name).map_err(serde::de::Error::custom)
    }
}

impl ScalarType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            ScalarType::Text => value.is_string(),
            ScalarType::Int => value.is_i64() || value.as_f64().and_then(whole_i64).is_some(),
            ScalarType::Number => value.is_number(),
            ScalarType::Boolean => value.is_boolean(),
            ScalarType::Uuid => value
                .as_str()
                .is_some_and(|s| Uuid::parse_str(s).is_ok()),
        }
    }

    fn coerce(self, value: Value) -> Value {
        // Protobuf structs carry every number as a double.
        if self == ScalarType::Int && value.is_f64() {
            if let Some(whole) = value.as_f64().and_then(whole_i64) {
                return Value::from(whole);
            }
        }
        value
    }
}

/// A double that is an integer inside the `i64` range. Out-of-range values
/// stay doubles so that decoding them into an int field fails.
fn whole_i64(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
}

impl HostType {
    /// Whether a non-null JSON value conforms to this host type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            HostType::Scalar(scalar) => scalar.accepts(value),
            HostType::Array(scalar) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| scalar.accepts(item))),
        }
    }

    /// Normalize a wire value so that it deserializes into this host type.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (HostType::Scalar(scalar), value) => scalar.coerce(value),
            (HostType::Array(scalar), Value::Array(items)) => {
                Value::Array(items.into_iter().map(|item| scalar.coerce(item)).collect())
            }
            (_, value) => value,
        }
    }
}

/// Implemented by every Rust type usable as a plain property.
pub trait FieldType {
    fn host_type() -> HostType;

    fn optional() -> bool {
        false
    }
}

macro_rules! field_types {
    ($($ty:ty => $scalar:expr),* $(,)?) => {$(
        impl FieldType for $ty {
            fn host_type() -> HostType {
                HostType::Scalar($scalar)
            }
        }

        impl FieldType for Vec<$ty> {
            fn host_type() -> HostType {
                HostType::Array($scalar)
            }
        }

        impl FieldType for Option<$ty> {
            fn host_type() -> HostType {
                HostType::Scalar($scalar)
            }

            fn optional() -> bool {
                true
            }
        }

        impl FieldType for Option<Vec<$ty>> {
            fn host_type() -> HostType {
                HostType::Array($scalar)
            }

            fn optional() -> bool {
                true
            }
        }
    )*};
}

field_types! {
    String => ScalarType::Text,
    i64 => ScalarType::Int,
    i32 => ScalarType::Int,
    u32 => ScalarType::Int,
    f64 => ScalarType::Number,
    f32 => ScalarType::Number,
    bool => ScalarType::Boolean,
    Uuid => ScalarType::Uuid,
}

/// Implemented by every Rust type usable as a reference property.
///
/// References always decode as a list of target identifiers, so only list
/// shapes qualify.
pub trait ReferenceField {
    fn optional() -> bool {
        false
    }
}

macro_rules! reference_fields {
    ($($ty:ty),* $(,)?) => {$(
        impl ReferenceField for Vec<$ty> {}

        impl ReferenceField for Option<Vec<$ty>> {
            fn optional() -> bool {
                true
            }
        }
    )*};
}

reference_fields!(Uuid, String);
