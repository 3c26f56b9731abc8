// SPDX-License-Identifier: PMPL-1.0-or-later
//! Model introspection: descriptor tables, schema derivation and comparison.
//!
//! A [`Model`] is built once per object type through [`Model::builder`] and
//! never changes afterwards. Typed structs expose theirs via [`ObjectModel`];
//! models of unknown remote collections are synthesized with
//! [`Model::from_remote_schema`].
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use weaviate_model::{Model, ObjectModel, ReferenceTarget};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Article {
//!     title: String,
//!     words: Option<i64>,
//!     group: Option<Vec<uuid::Uuid>>,
//! }
//!
//! impl ObjectModel for Article {
//!     fn model() -> Model {
//!         Model::builder("Article")
//!             .property::<String>("title")
//!             .property::<Option<i64>>("words")
//!             .reference::<Option<Vec<uuid::Uuid>>>("group", ReferenceTarget::named("Group"))
//!             .build()
//!     }
//! }
//!
//! let schema = Article::model().to_schema_properties().unwrap();
//! assert_eq!(schema[0].name, "Title");
//! assert_eq!(schema[2].data_type, vec!["Group".to_string()]);
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::property::{decapitalize_first, PropertyConfig, PropertyDescriptor, ReferenceTarget, SchemaProperty};
use crate::reference::collection_name;
use crate::types::{to_host_type, DataType, FieldType, ReferenceField};

/// Field names owned by every object and never declared as properties.
pub const BUILT_IN_FIELDS: &[&str] = &["uuid", "vector"];

/// A statically declared object type.
pub trait ObjectModel: Serialize + DeserializeOwned + Send + Sync {
    /// Descriptor table of the type's fields, in declaration order.
    fn model() -> Model;
}

/// Capability shared by typed models and dynamic records: conversion between
/// a property payload and its JSON property map.
pub trait Properties: Sized + Send + Sync {
    fn to_properties(&self) -> Result<Map<String, Value>>;

    fn from_properties(properties: Map<String, Value>, model: &Model) -> Result<Self>;
}

impl<M: ObjectModel> Properties for M {
    fn to_properties(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(ModelError::validation(format!(
                "model must serialize to an object, got {other}"
            ))),
        }
    }

    fn from_properties(properties: Map<String, Value>, model: &Model) -> Result<Self> {
        serde_json::from_value(Value::Object(properties))
            .map_err(|e| ModelError::validation(format!("{}: {e}", model.name())))
    }
}

/// Ordered descriptor table of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    properties: Vec<PropertyDescriptor>,
}

impl Model {
    pub fn builder(name: &str) -> ModelBuilder {
        ModelBuilder {
            name: collection_name(name),
            properties: Vec::new(),
        }
    }

    /// Canonical collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All declared fields, built-ins excluded.
    pub fn describe(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Descriptor of the field called `name`, if declared.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Non-reference fields, in declaration order.
    pub fn plain_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| !p.is_reference())
    }

    /// Reference fields, in declaration order.
    pub fn reference_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.is_reference())
    }

    /// Remote schema property list derived from the descriptor table.
    pub fn to_schema_properties(&self) -> Result<Vec<SchemaProperty>> {
        self.properties
            .iter()
            .map(PropertyDescriptor::to_schema_property)
            .collect()
    }

    /// Whether this model can be bound to a remote collection with the given
    /// properties.
    pub fn is_compatible_with(&self, remote: &[SchemaProperty]) -> Result<bool> {
        Ok(schemas_compatible(&self.to_schema_properties()?, remote))
    }

    /// Synthesize a model from a remote schema.
    ///
    /// Every field is optional: the remote schema says nothing about local
    /// validation constraints. Capitalized data types name a target
    /// collection and become references.
    pub fn from_remote_schema(class: &str, properties: &[SchemaProperty]) -> Result<Self> {
        let mut builder = Model::builder(class);
        for property in properties {
            let data_type = property.data_type.first().ok_or_else(|| {
                ModelError::UnsupportedType(format!("property `{}` has no data type", property.name))
            })?;

            let descriptor = match DataType::parse(data_type) {
                Ok(data_type) => PropertyDescriptor::plain(
                    property.name.clone(),
                    to_host_type(data_type)?,
                    true,
                    property.config.clone(),
                ),
                Err(_) if data_type.starts_with(char::is_uppercase) => PropertyDescriptor::reference(
                    property.name.clone(),
                    ReferenceTarget::named(data_type),
                    true,
                ),
                Err(err) => return Err(err),
            };
            builder = builder.push(descriptor);
        }
        Ok(builder.build())
    }
}

/// Declaration-time builder for [`Model`].
///
/// Declaring a built-in or a duplicate field name is a programming error and
/// panics.
#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    properties: Vec<PropertyDescriptor>,
}

impl ModelBuilder {
    pub fn property<T: FieldType>(self, name: &str) -> Self {
        self.property_with::<T>(name, PropertyConfig::default())
    }

    pub fn property_with<T: FieldType>(self, name: &str, config: PropertyConfig) -> Self {
        self.push(PropertyDescriptor::plain(name, T::host_type(), T::optional(), config))
    }

    /// Declare a reference field pointing at `target`.
    pub fn reference<R: ReferenceField>(self, name: &str, target: ReferenceTarget) -> Self {
        self.push(PropertyDescriptor::reference(name, target, R::optional()))
    }

    pub fn build(self) -> Model {
        Model {
            name: self.name,
            properties: self.properties,
        }
    }

    fn push(mut self, descriptor: PropertyDescriptor) -> Self {
        assert!(
            !BUILT_IN_FIELDS.contains(&descriptor.name()),
            "`{}` is a built-in field of every object",
            descriptor.name()
        );
        assert!(
            self.properties.iter().all(|p| p.name() != descriptor.name()),
            "field `{}` declared twice on {}",
            descriptor.name(),
            self.name
        );
        self.properties.push(descriptor);
        self
    }
}

/// Two property lists are compatible iff they hold the same multiset of
/// `{name, dataType}` pairs. Order is irrelevant; the remote lower-cases the
/// first letter of property names, so names are compared that way.
pub fn schemas_compatible(local: &[SchemaProperty], remote: &[SchemaProperty]) -> bool {
    fn keys(properties: &[SchemaProperty]) -> Vec<(String, Vec<String>)> {
        let mut keys: Vec<_> = properties
            .iter()
            .map(|p| (decapitalize_first(&p.name), p.data_type.clone()))
            .collect();
        keys.sort();
        keys
    }

    keys(local) == keys(remote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HostType, ScalarType};
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Serialize, Deserialize)]
    struct Group {
        name: String,
    }

    impl ObjectModel for Group {
        fn model() -> Model {
            Model::builder("group").property::<String>("name").build()
        }
    }

    fn schema(name: &str, data_type: &str) -> SchemaProperty {
        SchemaProperty {
            name: name.into(),
            data_type: vec![data_type.into()],
            config: PropertyConfig::default(),
        }
    }

    fn article() -> Model {
        Model::builder("Article")
            .property::<String>("title")
            .property_with::<Option<Vec<i64>>>("scores", PropertyConfig::default().index_searchable(false))
            .reference::<Vec<Uuid>>("group", ReferenceTarget::model::<Group>())
            .build()
    }

    #[test]
    fn test_describe_splits_plain_and_reference() {
        let model = article();
        assert_eq!(model.describe().len(), 3);
        let plain: Vec<_> = model.plain_properties().map(|p| p.name()).collect();
        let refs: Vec<_> = model.reference_properties().map(|p| p.name()).collect();
        assert_eq!(plain, vec!["title", "scores"]);
        assert_eq!(refs, vec!["group"]);
        assert!(model.property("scores").unwrap().optional());
        assert!(!model.property("group").unwrap().optional());
    }

    #[test]
    fn test_schema_properties() {
        let schema = article().to_schema_properties().unwrap();
        assert_eq!(schema[0], self::schema("Title", "text"));
        assert_eq!(schema[1].data_type, vec!["int[]".to_string()]);
        assert_eq!(schema[1].config.index_searchable, Some(false));
        assert_eq!(schema[2], self::schema("Group", "Group"));
    }

    #[test]
    fn test_compatibility_ignores_order_and_first_letter_case() {
        let remote = vec![schema("group", "Group"), schema("title", "text"), schema("scores", "int[]")];
        assert!(article().is_compatible_with(&remote).unwrap());
    }

    #[test]
    fn test_compatibility_counts_duplicates() {
        let a = vec![schema("a", "int"), schema("a", "int")];
        let b = vec![schema("a", "int")];
        assert!(!schemas_compatible(&a, &b));
        assert!(!schemas_compatible(&b, &a));
        assert!(!schemas_compatible(&b, &[schema("b", "text")]));
    }

    #[test]
    fn test_remote_schema_synthesis() {
        let remote = vec![schema("name", "text"), schema("tags", "string[]"), schema("group", "Group")];
        let model = Model::from_remote_schema("article", &remote).unwrap();
        assert_eq!(model.name(), "Article");
        assert!(model.describe().iter().all(|p| p.optional()));
        assert_eq!(
            model.property("tags").unwrap().host_type(),
            Some(HostType::Array(ScalarType::Text))
        );
        assert_eq!(model.property("group").unwrap().target().unwrap().name(), "Group");
    }

    #[test]
    fn test_remote_schema_with_unknown_primitive_fails() {
        let remote = vec![schema("location", "geoCoordinates")];
        let err = Model::from_remote_schema("Place", &remote).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedType(_)));
    }

    #[test]
    #[should_panic(expected = "built-in")]
    fn test_built_in_names_are_reserved() {
        Model::builder("Bad").property::<String>("uuid");
    }
}
