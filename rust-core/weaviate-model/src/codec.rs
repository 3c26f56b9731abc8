// SPDX-License-Identifier: PMPL-1.0-or-later
//! Object codec: typed objects to wire payloads and back.
//!
//! Every write goes through [`encode`], which validates the payload against
//! its [`Model`] first, so a local type error never reaches the remote.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::model::{Model, Properties};
use crate::object::{Metadata, Object};
use crate::property::PropertyKind;
use crate::reference::{from_beacons, reference_ids, to_beacons};

/// Whether unset fields are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    /// Every declared field (create, replace).
    Full,
    /// Only explicitly set fields (merge update).
    Partial,
}

/// Write payload for one object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireObject {
    pub class: String,
    pub id: Uuid,
    pub properties: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

/// Object as returned by the REST object endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestObject {
    #[serde(default)]
    pub class: String,
    pub id: Uuid,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
    #[serde(default)]
    pub creation_time_unix: Option<i64>,
    #[serde(default)]
    pub last_update_time_unix: Option<i64>,
    #[serde(default)]
    pub tenant: Option<String>,
}

/// Check a property map for structural conformance to `model`.
pub fn validate(model: &Model, properties: &Map<String, Value>) -> Result<()> {
    if let Some(unknown) = properties.keys().find(|name| model.property(name).is_none()) {
        return Err(ModelError::validation(format!(
            "`{unknown}` is not a property of {}",
            model.name()
        )));
    }

    for descriptor in model.describe() {
        match properties.get(descriptor.name()) {
            None | Some(Value::Null) => {
                if !descriptor.optional() {
                    return Err(ModelError::validation(format!(
                        "required field `{}` of {} is missing",
                        descriptor.name(),
                        model.name()
                    )));
                }
            }
            Some(value) => match descriptor.kind() {
                PropertyKind::Plain { host_type, .. } => {
                    if !host_type.accepts(value) {
                        return Err(ModelError::validation(format!(
                            "field `{}` expects {host_type:?}, got {value}",
                            descriptor.name()
                        )));
                    }
                }
                PropertyKind::Reference { .. } => {
                    reference_ids(descriptor.name(), value)?;
                }
            },
        }
    }
    Ok(())
}

/// Serialize an object into its write payload.
///
/// References become beacon lists; null references are left out. In
/// [`EncodeMode::Partial`] fields that were never explicitly set are left out
/// too, while a field explicitly set to null is sent as null.
pub fn encode<P: Properties>(object: &Object<P>, model: &Model, mode: EncodeMode) -> Result<WireObject> {
    let properties = object.properties.to_properties()?;
    validate(model, &properties)?;

    let mut wire = Map::new();
    for (name, value) in properties {
        if mode == EncodeMode::Partial && !object.is_set(&name) {
            continue;
        }
        let Some(descriptor) = model.property(&name) else {
            continue;
        };

        match descriptor.target() {
            Some(target) => {
                if value.is_null() {
                    continue;
                }
                let ids = reference_ids(&name, &value)?;
                wire.insert(name, serde_json::to_value(to_beacons(ids, target.name()))?);
            }
            None => {
                wire.insert(name, value);
            }
        }
    }

    debug!(class = %model.name(), id = %object.uuid, fields = wire.len(), ?mode, "Encoded object");
    Ok(WireObject {
        class: model.name().to_string(),
        id: object.uuid,
        properties: wire,
        vector: object.vector.clone(),
        tenant: None,
    })
}

/// Bring a remote property map into the shape `model` expects.
///
/// Reference beacons (or bare identifiers) become identifier lists, numbers
/// are coerced to the declared host type, undeclared properties are dropped.
pub fn decode_properties(properties: Map<String, Value>, model: &Model) -> Result<Map<String, Value>> {
    let mut decoded = Map::new();
    for (name, value) in properties {
        let Some(descriptor) = model.property(&name) else {
            debug!(class = %model.name(), property = %name, "Dropping undeclared property");
            continue;
        };

        let value = match descriptor.kind() {
            _ if value.is_null() => value,
            PropertyKind::Reference { .. } => {
                let ids = from_beacons(&value)?;
                Value::Array(ids.into_iter().map(Value::String).collect())
            }
            PropertyKind::Plain { host_type, .. } => host_type.coerce(value),
        };
        decoded.insert(name, value);
    }
    Ok(decoded)
}

/// Deserialize a REST object into a typed object plus its metadata.
///
/// Fields absent from the payload take the model default; a missing required
/// field is a validation error.
pub fn decode<P: Properties>(object: RestObject, model: &Model) -> Result<(Object<P>, Metadata)> {
    let properties = decode_properties(object.properties, model)?;
    let properties = P::from_properties(properties, model)?;

    let metadata = Metadata {
        uuid: Some(object.id),
        vector: object.vector.clone(),
        creation_time_unix: object.creation_time_unix,
        last_update_time_unix: object.last_update_time_unix,
        ..Metadata::default()
    };

    let mut decoded = Object::new(properties).with_uuid(object.id);
    decoded.vector = object.vector;
    Ok((decoded, metadata))
}
