// SPDX-License-Identifier: PMPL-1.0-or-later
//! Reference codec: identifiers to and from beacon URIs.
//!
//! A beacon has the shape `weaviate://<authority>/[<Collection>/]<uuid>`.
//! Same-deployment beacons use the `localhost` authority. On read only the
//! trailing path segment matters, so beacons from other authorities are
//! accepted verbatim.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::property::capitalize_first;

pub const BEACON_SCHEME: &str = "weaviate://";
pub const LOCAL_AUTHORITY: &str = "localhost";

/// One reference in its wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beacon {
    pub beacon: String,
}

impl Beacon {
    /// Beacon pointing at `id` inside `collection` on the local deployment.
    pub fn local(collection: &str, id: impl Display) -> Self {
        Self {
            beacon: format!("{BEACON_SCHEME}{LOCAL_AUTHORITY}/{collection}/{id}"),
        }
    }

    /// Beacon pointing at `id` without naming a collection.
    pub fn untyped(id: impl Display) -> Self {
        Self {
            beacon: format!("{BEACON_SCHEME}{LOCAL_AUTHORITY}/{id}"),
        }
    }

    /// Source beacon of a batch reference: a property of one object.
    pub fn property(collection: &str, id: impl Display, property: &str) -> Self {
        Self {
            beacon: format!("{BEACON_SCHEME}{LOCAL_AUTHORITY}/{collection}/{id}/{property}"),
        }
    }

    /// Trailing path segment, normally the target identifier.
    pub fn identifier(&self) -> &str {
        trailing_segment(&self.beacon)
    }
}

/// Canonical collection name: `capitalize(lower(name))`.
pub fn collection_name(raw: &str) -> String {
    capitalize_first(&raw.to_lowercase())
}

/// One beacon per identifier.
pub fn to_beacons<I, T>(ids: I, target: &str) -> Vec<Beacon>
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    ids.into_iter().map(|id| Beacon::local(target, id)).collect()
}

/// Extract the identifiers from a list of beacons.
///
/// Accepts `[{"beacon": ...}]` as returned by the REST API as well as a bare
/// list of beacon strings. Identifiers are not re-validated.
pub fn from_beacons(value: &Value) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| ModelError::validation(format!("expected a beacon list, got {value}")))?;

    items
        .iter()
        .map(|item| {
            let uri = match item {
                Value::String(uri) => uri.as_str(),
                Value::Object(map) => map
                    .get("beacon")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ModelError::validation(format!("beacon object without uri: {item}")))?,
                other => return Err(ModelError::validation(format!("unexpected beacon: {other}"))),
            };
            Ok(trailing_segment(uri).to_string())
        })
        .collect()
}

/// Read the identifiers held by a reference field value on the write path.
///
/// A reference value is a single identifier string or a list of them; every
/// identifier must be a UUID.
pub fn reference_ids(field: &str, value: &Value) -> Result<Vec<Uuid>> {
    let parse = |item: &Value| -> Result<Uuid> {
        item.as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| {
                ModelError::validation(format!("reference `{field}` holds a non-UUID value: {item}"))
            })
    };

    match value {
        Value::Array(items) => items.iter().map(parse).collect(),
        single => Ok(vec![parse(single)?]),
    }
}

fn trailing_segment(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}
