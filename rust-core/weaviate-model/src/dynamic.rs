// SPDX-License-Identifier: PMPL-1.0-or-later
//! Untyped records for collections without a Rust model.
//!
//! A [`DynamicProperties`] maps field names to tagged [`FieldValue`]s and is
//! decoded against a [`Model`] (usually one synthesized from the remote
//! schema), so it flows through the same codec as typed models.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::model::{Model, Properties};
use crate::property::{PropertyDescriptor, PropertyKind};
use crate::types::{HostType, ScalarType};

/// A tagged property value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Int(i64),
    Number(f64),
    Boolean(bool),
    Uuid(Uuid),
    Array(Vec<FieldValue>),
    /// Identifiers of the linked objects.
    References(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// JSON form as sent in object payloads. References become plain
    /// identifier strings; beacons are built by the codec.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(s) => Value::from(s.as_str()),
            FieldValue::Int(n) => Value::from(*n),
            FieldValue::Number(n) => Value::from(*n),
            FieldValue::Boolean(b) => Value::from(*b),
            FieldValue::Uuid(id) => Value::from(id.to_string()),
            FieldValue::Array(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::References(ids) => Value::Array(ids.iter().map(|id| Value::from(id.as_str())).collect()),
        }
    }

    /// Decode a JSON value as the field described by `descriptor`.
    pub fn from_json(value: Value, descriptor: &PropertyDescriptor) -> Result<Self> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }

        let mismatch = |value: &Value| {
            ModelError::validation(format!("field `{}` cannot hold {value}", descriptor.name()))
        };

        match descriptor.kind() {
            PropertyKind::Reference { .. } => {
                let ids = match &value {
                    Value::Array(items) => items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string).ok_or_else(|| mismatch(item)))
                        .collect::<Result<Vec<_>>>()?,
                    Value::String(id) => vec![id.clone()],
                    other => return Err(mismatch(other)),
                };
                Ok(FieldValue::References(ids))
            }
            PropertyKind::Plain { host_type, .. } => {
                let value = host_type.coerce(value);
                match host_type {
                    HostType::Scalar(scalar) => scalar_value(&value, *scalar).ok_or_else(|| mismatch(&value)),
                    HostType::Array(scalar) => {
                        let items = value.as_array().ok_or_else(|| mismatch(&value))?;
                        items
                            .iter()
                            .map(|item| scalar_value(item, *scalar).ok_or_else(|| mismatch(item)))
                            .collect::<Result<Vec<_>>>()
                            .map(FieldValue::Array)
                    }
                }
            }
        }
    }
}

fn scalar_value(value: &Value, scalar: ScalarType) -> Option<FieldValue> {
    match scalar {
        ScalarType::Text => value.as_str().map(|s| FieldValue::Text(s.to_string())),
        ScalarType::Int => value.as_i64().map(FieldValue::Int),
        ScalarType::Number => value.as_f64().map(FieldValue::Number),
        ScalarType::Boolean => value.as_bool().map(FieldValue::Boolean),
        ScalarType::Uuid => value
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(FieldValue::Uuid),
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Field name to value mapping for collections known only at runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicProperties {
    fields: BTreeMap<String, FieldValue>,
}

impl DynamicProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Link `name` to the given target identifiers.
    pub fn with_references<I: IntoIterator<Item = Uuid>>(mut self, name: impl Into<String>, ids: I) -> Self {
        let ids = ids.into_iter().map(|id| id.to_string()).collect();
        self.fields.insert(name.into(), FieldValue::References(ids));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Properties for DynamicProperties {
    fn to_properties(&self) -> Result<Map<String, Value>> {
        Ok(self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect())
    }

    fn from_properties(mut properties: Map<String, Value>, model: &Model) -> Result<Self> {
        let mut fields = BTreeMap::new();
        for descriptor in model.describe() {
            let value = properties.remove(descriptor.name()).unwrap_or(Value::Null);
            fields.insert(descriptor.name().to_string(), FieldValue::from_json(value, descriptor)?);
        }

        if let Some(unknown) = properties.keys().next() {
            return Err(ModelError::validation(format!(
                "`{unknown}` is not a property of {}",
                model.name()
            )));
        }
        Ok(Self { fields })
    }
}
