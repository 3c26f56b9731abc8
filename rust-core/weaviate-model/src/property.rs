// SPDX-License-Identifier: PMPL-1.0-or-later
//! Per-field metadata: plain vs. reference classification and schema overrides.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ObjectModel;
use crate::reference::collection_name;
use crate::types::{to_remote_type, HostType};

/// Tokenization strategy for text properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tokenization {
    Word,
    Whitespace,
    Lowercase,
    Field,
    /// Any strategy this client does not model (read-only).
    #[serde(other)]
    Other,
}

/// Optional schema overrides attached to a plain property at declaration time.
///
/// Only the keys that were set are sent to the remote schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyConfig {
    /// Build a filter index for the property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_filterable: Option<bool>,
    /// Build a keyword (bm25) index for the property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_searchable: Option<bool>,
    /// How text is split into tokens for indexing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenization: Option<Tokenization>,
    /// Free-text description stored with the schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyConfig {
    pub fn index_filterable(mut self, enabled: bool) -> Self {
        self.index_filterable = Some(enabled);
        self
    }

    pub fn index_searchable(mut self, enabled: bool) -> Self {
        self.index_searchable = Some(enabled);
        self
    }

    pub fn tokenization(mut self, tokenization: Tokenization) -> Self {
        self.tokenization = Some(tokenization);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Target collection of a reference property.
///
/// Whether declared from a model type or from a bare name, the target always
/// resolves to `capitalize(lower(name))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceTarget {
    name: String,
}

impl ReferenceTarget {
    /// Reference the collection backing the model `M`.
    pub fn model<M: ObjectModel>() -> Self {
        Self::named(M::model().name())
    }

    /// Reference a collection by name.
    pub fn named(name: &str) -> Self {
        Self {
            name: collection_name(name),
        }
    }

    /// Canonical collection name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Whether a field is a plain value or a link to another collection.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Plain {
        host_type: HostType,
        config: PropertyConfig,
    },
    Reference {
        target: ReferenceTarget,
    },
}

/// Declaration-time description of one model field.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    name: String,
    optional: bool,
    kind: PropertyKind,
}

impl PropertyDescriptor {
    pub fn plain(name: impl Into<String>, host_type: HostType, optional: bool, config: PropertyConfig) -> Self {
        Self {
            name: name.into(),
            optional,
            kind: PropertyKind::Plain { host_type, config },
        }
    }

    pub fn reference(name: impl Into<String>, target: ReferenceTarget, optional: bool) -> Self {
        Self {
            name: name.into(),
            optional,
            kind: PropertyKind::Reference { target },
        }
    }

    /// Field name as declared (and as used in wire payloads).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn optional(&self) -> bool {
        self.optional
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, PropertyKind::Reference { .. })
    }

    /// Host type of a plain field; `None` for references.
    pub fn host_type(&self) -> Option<HostType> {
        match &self.kind {
            PropertyKind::Plain { host_type, .. } => Some(*host_type),
            PropertyKind::Reference { .. } => None,
        }
    }

    /// Target collection of a reference; `None` for plain fields.
    pub fn target(&self) -> Option<&ReferenceTarget> {
        match &self.kind {
            PropertyKind::Reference { target } => Some(target),
            PropertyKind::Plain { .. } => None,
        }
    }

    /// Remote schema record for this field.
    pub fn to_schema_property(&self) -> Result<SchemaProperty> {
        let name = capitalize_first(&self.name);
        match &self.kind {
            PropertyKind::Plain { host_type, config } => Ok(SchemaProperty {
                name,
                data_type: vec![to_remote_type(*host_type)?.to_string()],
                config: config.clone(),
            }),
            PropertyKind::Reference { target } => Ok(SchemaProperty {
                name,
                data_type: vec![target.name().to_string()],
                config: PropertyConfig::default(),
            }),
        }
    }
}

/// Wire form of one remote schema property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProperty {
    pub name: String,
    /// Data type names, e.g. `["text"]` or `["Group"]` for a reference.
    pub data_type: Vec<String>,
    #[serde(flatten)]
    pub config: PropertyConfig,
}

pub(crate) fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn decapitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarType;
    use serde_json::json;

    #[test]
    fn test_plain_property_merges_config() {
        let descriptor = PropertyDescriptor::plain(
            "title",
            HostType::Scalar(ScalarType::Text),
            false,
            PropertyConfig::default()
                .index_filterable(false)
                .tokenization(Tokenization::Field),
        );
        let property = descriptor.to_schema_property().unwrap();
        assert_eq!(
            serde_json::to_value(&property).unwrap(),
            json!({
                "name": "Title",
                "dataType": ["text"],
                "indexFilterable": false,
                "tokenization": "field",
            })
        );
    }

    #[test]
    fn test_reference_property_uses_target_as_data_type() {
        let descriptor = PropertyDescriptor::reference("group", ReferenceTarget::named("GROUP"), true);
        let property = descriptor.to_schema_property().unwrap();
        assert_eq!(property.name, "Group");
        assert_eq!(property.data_type, vec!["Group".to_string()]);
        assert!(descriptor.is_reference());
        assert_eq!(descriptor.host_type(), None);
    }

    #[test]
    fn test_camel_case_names_keep_their_tail() {
        assert_eq!(capitalize_first("firstName"), "FirstName");
        assert_eq!(decapitalize_first("FirstName"), "firstName");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_remote_schema_extras_are_ignored() {
        let property: SchemaProperty = serde_json::from_value(json!({
            "name": "heat",
            "dataType": ["text"],
            "tokenization": "trigram",
            "moduleConfig": {"text2vec-contextionary": {"skip": false}},
        }))
        .unwrap();
        assert_eq!(property.config.tokenization, Some(Tokenization::Other));
    }
}
