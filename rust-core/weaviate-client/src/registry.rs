// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Collection registry: create, bind and drop remote collections.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};
use weaviate_model::{collection_name, DynamicProperties, Model, ObjectModel, SchemaProperty};

use crate::collection::Collection;
use crate::connection::Connection;
use crate::error::{Result, WeaviateError};

// ---------------------------------------------------------------------------
// Collection configuration
// ---------------------------------------------------------------------------

/// Multi-tenancy switch of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiTenancyConfig {
    /// Objects live in per-tenant partitions and every call names a tenant.
    pub enabled: bool,
}

/// Replication settings of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationConfig {
    /// Number of copies kept of every object.
    pub factor: u32,
}

/// Collection-level settings sent on creation; the properties come from the
/// model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    /// Vectorizer module, `"none"` for client-supplied vectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectorizer: Option<String>,
    /// Free-text description stored with the class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_tenancy_config: Option<MultiTenancyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_config: Option<ReplicationConfig>,
}

impl CollectionConfig {
    /// Set the vectorizer module.
    pub fn vectorizer(mut self, vectorizer: impl Into<String>) -> Self {
        self.vectorizer = Some(vectorizer.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Enable or disable multi-tenancy.
    pub fn multi_tenancy(mut self, enabled: bool) -> Self {
        self.multi_tenancy_config = Some(MultiTenancyConfig { enabled });
        self
    }

    pub fn replication_factor(mut self, factor: u32) -> Self {
        self.replication_config = Some(ReplicationConfig { factor });
        self
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// Body of `POST /v1/schema`.
#[derive(Debug, Serialize)]
struct ClassDefinition<'a> {
    class: &'a str,
    properties: Vec<SchemaProperty>,
    #[serde(flatten)]
    config: &'a CollectionConfig,
}

/// The part of `GET /v1/schema/{Class}` the registry reads.
#[derive(Debug, Deserialize)]
struct RemoteClass {
    class: String,
    #[serde(default)]
    properties: Vec<SchemaProperty>,
}

/// Entry point to the collections of one deployment.
#[derive(Clone)]
pub struct Collections {
    connection: Arc<dyn Connection>,
}

impl Collections {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self { connection }
    }

    /// Create the collection of `M` and bind it.
    ///
    /// # Errors
    ///
    /// Returns [`WeaviateError::UnsupportedType`] if a field has no remote
    /// data type, or [`WeaviateError::UnexpectedStatusCode`] if the remote
    /// refuses the class (for instance because it already exists).
    #[instrument(skip(self, config))]
    pub async fn create<M: ObjectModel>(&self, config: CollectionConfig) -> Result<Collection<M>> {
        let model = M::model();
        let definition = ClassDefinition {
            class: model.name(),
            properties: model.to_schema_properties()?,
            config: &config,
        };
        self.connection
            .post("/v1/schema", &serde_json::to_value(&definition)?)
            .await?
            .success("Create collection")?;

        info!(class = %model.name(), properties = definition.properties.len(), "Collection created");
        Ok(Collection::new(Arc::clone(&self.connection), model))
    }

    /// Bind `M` to its existing remote collection.
    ///
    /// # Errors
    ///
    /// Returns [`WeaviateError::SchemaMismatch`] unless the remote holds
    /// exactly the properties `M` declares, and
    /// [`WeaviateError::UnexpectedStatusCode`] if the collection is missing.
    pub async fn get<M: ObjectModel>(&self) -> Result<Collection<M>> {
        let model = M::model();
        let remote = self.fetch_class(model.name()).await?;
        if !model.is_compatible_with(&remote.properties)? {
            return Err(WeaviateError::SchemaMismatch(format!(
                "model {} declares [{}] but the remote collection holds [{}]",
                model.name(),
                describe(&model.to_schema_properties()?),
                describe(&remote.properties)
            )));
        }
        Ok(Collection::new(Arc::clone(&self.connection), model))
    }

    /// Bind a collection with no Rust model, synthesizing one from its
    /// remote schema. Every field of the synthesized model is optional.
    #[instrument(skip(self))]
    pub async fn get_dynamic(&self, name: &str) -> Result<(Collection<DynamicProperties>, Model)> {
        let remote = self.fetch_class(&collection_name(name)).await?;
        let model = Model::from_remote_schema(&remote.class, &remote.properties)?;
        Ok((Collection::new(Arc::clone(&self.connection), model.clone()), model))
    }

    pub async fn exists<M: ObjectModel>(&self) -> Result<bool> {
        self.exists_named(M::model().name()).await
    }

    pub async fn exists_named(&self, name: &str) -> Result<bool> {
        let response = self.connection.get(&class_path(name)).await?;
        match response.status {
            404 => Ok(false),
            _ => response.success("Get schema").map(|_| true),
        }
    }

    /// Drop the collection of `M` and every object in it.
    pub async fn delete<M: ObjectModel>(&self) -> Result<()> {
        self.delete_named(M::model().name()).await
    }

    #[instrument(skip(self))]
    pub async fn delete_named(&self, name: &str) -> Result<()> {
        self.connection
            .delete(&class_path(name), None)
            .await?
            .success("Delete collection")?;
        info!("Collection deleted");
        Ok(())
    }

    async fn fetch_class(&self, name: &str) -> Result<RemoteClass> {
        let body: Value = self.connection.get(&class_path(name)).await?.success("Get schema")?;
        Ok(serde_json::from_value(body)?)
    }
}

fn class_path(name: &str) -> String {
    format!("/v1/schema/{}", collection_name(name))
}

fn describe(properties: &[SchemaProperty]) -> String {
    properties
        .iter()
        .map(|p| format!("{}: {}", p.name, p.data_type.join("|")))
        .collect::<Vec<_>>()
        .join(", ")
}
