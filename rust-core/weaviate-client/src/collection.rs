// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Collection façade: object CRUD and reference mutation over REST.
//!
//! A [`Collection`] is bound to one model and shares its connection with every
//! façade derived from it. [`Collection::with_tenant`] and
//! [`Collection::with_consistency_level`] return new façades and never touch
//! the original.
//!
//! Every write encodes (and so validates) the object before the request is
//! built; a local type error never reaches the remote.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use weaviate_model::{
    decode, encode, to_beacons, Beacon, EncodeMode, Metadata, Model, Object, Properties, ReferenceTarget,
    RestObject, WireObject,
};

use crate::connection::Connection;
use crate::error::{Result, WeaviateError};
use crate::query::Query;
use crate::tenants::Tenants;

/// How many replicas must acknowledge a read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsistencyLevel {
    One,
    Quorum,
    All,
}

impl ConsistencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsistencyLevel::One => "ONE",
            ConsistencyLevel::Quorum => "QUORUM",
            ConsistencyLevel::All => "ALL",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-object failure reported by a batch call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join("; "))]
pub struct ObjectErrors {
    /// Messages reported by the remote for this item.
    pub messages: Vec<String>,
}

/// One link of a batch reference insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReference {
    /// Source object in this collection.
    pub from: Uuid,
    /// Target object in the referenced collection.
    pub to: Uuid,
}

impl BatchReference {
    pub fn new(from: Uuid, to: Uuid) -> Self {
        Self { from, to }
    }
}

/// Typed access to one remote collection.
pub struct Collection<P> {
    connection: Arc<dyn Connection>,
    model: Arc<Model>,
    tenant: Option<String>,
    consistency_level: Option<ConsistencyLevel>,
    include_vector: bool,
    _payload: PhantomData<fn() -> P>,
}

impl<P> Clone for Collection<P> {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            model: Arc::clone(&self.model),
            tenant: self.tenant.clone(),
            consistency_level: self.consistency_level,
            include_vector: self.include_vector,
            _payload: PhantomData,
        }
    }
}

impl<P> fmt::Debug for Collection<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.model.name())
            .field("tenant", &self.tenant)
            .field("consistency_level", &self.consistency_level)
            .finish_non_exhaustive()
    }
}

impl<P> Collection<P> {
    pub(crate) fn new(connection: Arc<dyn Connection>, model: Model) -> Self {
        Self {
            connection,
            model: Arc::new(model),
            tenant: None,
            consistency_level: None,
            include_vector: false,
            _payload: PhantomData,
        }
    }

    /// Canonical collection name.
    pub fn name(&self) -> &str {
        self.model.name()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    pub fn consistency_level(&self) -> Option<ConsistencyLevel> {
        self.consistency_level
    }

    /// Same collection, scoped to `tenant`.
    pub fn with_tenant(&self, tenant: impl Into<String>) -> Self {
        Self {
            tenant: Some(tenant.into()),
            ..self.clone()
        }
    }

    pub fn with_consistency_level(&self, level: ConsistencyLevel) -> Self {
        Self {
            consistency_level: Some(level),
            ..self.clone()
        }
    }

    /// Same collection, returning stored vectors from REST reads.
    pub fn with_vector_included(&self) -> Self {
        Self {
            include_vector: true,
            ..self.clone()
        }
    }

    /// Start a gRPC search scoped like this façade.
    pub fn query(&self) -> Query<P> {
        Query::new(Arc::clone(&self.connection), Arc::clone(&self.model), self.tenant.clone())
    }

    /// Tenant management of this collection.
    pub fn tenants(&self) -> Tenants {
        Tenants::new(Arc::clone(&self.connection), self.name().to_string())
    }

    fn object_path(&self, id: Uuid) -> String {
        format!("/v1/objects/{}/{id}", self.name())
    }

    fn reference_path(&self, from: Uuid, property: &str) -> String {
        format!("/v1/objects/{}/{from}/references/{property}", self.name())
    }

    /// Query parameters of object writes; the tenant travels in the body.
    fn write_params(&self) -> Vec<(&'static str, String)> {
        self.consistency_level
            .map(|level| ("consistency_level", level.to_string()))
            .into_iter()
            .collect()
    }

    /// Query parameters of reads and reference mutations.
    fn scope_params(&self) -> Vec<(&'static str, String)> {
        let mut params = self.write_params();
        if let Some(tenant) = &self.tenant {
            params.push(("tenant", tenant.clone()));
        }
        params
    }

    fn read_params(&self) -> Vec<(&'static str, String)> {
        let mut params = self.scope_params();
        if self.include_vector {
            params.push(("include", "vector".to_string()));
        }
        params
    }

    fn reference_target(&self, property: &str) -> Result<&str> {
        self.model
            .property(property)
            .and_then(|descriptor| descriptor.target())
            .map(ReferenceTarget::name)
            .ok_or_else(|| {
                WeaviateError::Validation(format!("`{property}` is not a reference property of {}", self.name()))
            })
    }

    /// Link `from` to `to` through the reference `property`.
    ///
    /// # Errors
    ///
    /// Returns [`WeaviateError::Validation`] without sending anything when
    /// `property` is not a reference of the model.
    #[instrument(skip(self), fields(class = %self.name(), tenant = ?self.tenant))]
    pub async fn reference_add(&self, from: Uuid, property: &str, to: Uuid) -> Result<()> {
        let beacon = Beacon::local(self.reference_target(property)?, to);
        let path = with_params(self.reference_path(from, property), &self.scope_params());
        self.connection
            .post(&path, &serde_json::to_value(beacon)?)
            .await?
            .success("Add reference")?;
        Ok(())
    }

    /// Remove the link from `from` to `to`.
    #[instrument(skip(self), fields(class = %self.name(), tenant = ?self.tenant))]
    pub async fn reference_delete(&self, from: Uuid, property: &str, to: Uuid) -> Result<()> {
        let beacon = Beacon::local(self.reference_target(property)?, to);
        let path = with_params(self.reference_path(from, property), &self.scope_params());
        self.connection
            .delete(&path, Some(&serde_json::to_value(beacon)?))
            .await?
            .success("Delete reference")?;
        Ok(())
    }

    /// Replace every link of `property` with `to`, in order.
    #[instrument(skip(self, to), fields(class = %self.name(), tenant = ?self.tenant, count = to.len()))]
    pub async fn reference_replace(&self, from: Uuid, property: &str, to: &[Uuid]) -> Result<()> {
        let beacons = to_beacons(to, self.reference_target(property)?);
        let path = with_params(self.reference_path(from, property), &self.scope_params());
        self.connection
            .put(&path, &serde_json::to_value(beacons)?)
            .await?
            .success("Replace references")?;
        Ok(())
    }

    /// Add many links of `property` in one call, reporting each link's
    /// outcome in input order.
    #[instrument(skip(self, references), fields(class = %self.name(), count = references.len()))]
    pub async fn reference_batch_add(
        &self,
        property: &str,
        references: &[BatchReference],
    ) -> Result<Vec<std::result::Result<(), ObjectErrors>>> {
        self.reference_target(property)?;

        let body: Vec<Value> = references
            .iter()
            .map(|reference| {
                let mut link = json!({
                    "from": Beacon::property(self.name(), reference.from, property).beacon,
                    "to": Beacon::untyped(reference.to).beacon,
                });
                if let Some(tenant) = &self.tenant {
                    link["tenant"] = Value::String(tenant.clone());
                }
                link
            })
            .collect();

        let path = with_params("/v1/batch/references".to_string(), &self.write_params());
        let response = self
            .connection
            .post(&path, &Value::Array(body))
            .await?
            .success("Batch add references")?;

        let outcomes = batch_outcomes(&response, references.len(), |_| ());
        report_failures(&outcomes, "references");
        Ok(outcomes)
    }
}

impl<P: Properties> Collection<P> {
    fn wire(&self, object: &Object<P>, mode: EncodeMode) -> Result<WireObject> {
        let mut wire = encode(object, &self.model, mode)?;
        wire.tenant = self.tenant.clone();
        Ok(wire)
    }

    /// Create `object` and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WeaviateError::Validation`] before any request when the
    /// payload does not match the model.
    #[instrument(skip(self, object), fields(class = %self.name(), id = %object.uuid, tenant = ?self.tenant))]
    pub async fn insert(&self, object: &Object<P>) -> Result<Uuid> {
        let wire = self.wire(object, EncodeMode::Full)?;
        let path = with_params("/v1/objects".to_string(), &self.write_params());
        self.connection
            .post(&path, &serde_json::to_value(&wire)?)
            .await?
            .success("Create object")?;
        debug!("Object inserted");
        Ok(object.uuid)
    }

    /// Insert many objects in one call.
    ///
    /// Every object is validated before the call; after it, each position of
    /// the result holds that object's identifier or its errors.
    #[instrument(skip(self, objects), fields(class = %self.name(), count = objects.len(), tenant = ?self.tenant))]
    pub async fn insert_many(&self, objects: &[Object<P>]) -> Result<Vec<std::result::Result<Uuid, ObjectErrors>>> {
        let wires = objects
            .iter()
            .map(|object| self.wire(object, EncodeMode::Full))
            .collect::<Result<Vec<_>>>()?;

        let path = with_params("/v1/batch/objects".to_string(), &self.write_params());
        let body = json!({ "objects": wires });
        let response = self
            .connection
            .post(&path, &body)
            .await?
            .success("Batch insert objects")?;

        let outcomes = batch_outcomes(&response, objects.len(), |index| objects[index].uuid);
        report_failures(&outcomes, "objects");
        Ok(outcomes)
    }

    /// Overwrite the stored object with the same identifier.
    #[instrument(skip(self, object), fields(class = %self.name(), id = %object.uuid, tenant = ?self.tenant))]
    pub async fn replace(&self, object: &Object<P>) -> Result<()> {
        let wire = self.wire(object, EncodeMode::Full)?;
        let path = with_params(self.object_path(object.uuid), &self.write_params());
        self.connection
            .put(&path, &serde_json::to_value(&wire)?)
            .await?
            .success("Replace object")?;
        Ok(())
    }

    /// Merge the explicitly set fields of `object` into the stored object.
    #[instrument(skip(self, object), fields(class = %self.name(), id = %object.uuid, tenant = ?self.tenant))]
    pub async fn update(&self, object: &Object<P>) -> Result<()> {
        let wire = self.wire(object, EncodeMode::Partial)?;
        let path = with_params(self.object_path(object.uuid), &self.write_params());
        self.connection
            .patch(&path, &serde_json::to_value(&wire)?)
            .await?
            .success("Update object")?;
        Ok(())
    }

    /// Fetch one object; `None` when it does not exist.
    #[instrument(skip(self), fields(class = %self.name(), tenant = ?self.tenant))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<(Object<P>, Metadata)>> {
        let path = with_params(self.object_path(id), &self.read_params());
        let response = self.connection.get(&path).await?;
        if response.status == 404 {
            return Ok(None);
        }

        let body = response.success("Get object")?;
        let object: RestObject = serde_json::from_value(body)?;
        Ok(Some(decode(object, &self.model)?))
    }

    /// Scan the collection.
    #[instrument(skip(self), fields(class = %self.name(), tenant = ?self.tenant))]
    pub async fn get(&self) -> Result<Vec<(Object<P>, Metadata)>> {
        let mut params = vec![("class", self.name().to_string())];
        params.extend(self.read_params());
        let body = self
            .connection
            .get(&with_params("/v1/objects".to_string(), &params))
            .await?
            .success("Get objects")?;

        let listing: ObjectListing = serde_json::from_value(body)?;
        listing
            .objects
            .into_iter()
            .map(|object| decode(object, &self.model).map_err(WeaviateError::from))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ObjectListing {
    #[serde(default)]
    objects: Vec<RestObject>,
}

fn with_params(path: String, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path;
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{path}?{query}")
}

/// Per-item outcome of a batch reply, in request order.
///
/// An item is failed when the remote reports errors for it or when the reply
/// has no entry at its position.
fn batch_outcomes<T, F>(response: &Value, expected: usize, success: F) -> Vec<std::result::Result<T, ObjectErrors>>
where
    F: Fn(usize) -> T,
{
    let items = response.as_array().map(Vec::as_slice).unwrap_or_default();
    (0..expected)
        .map(|index| match items.get(index) {
            None => Err(ObjectErrors {
                messages: vec!["no result returned for this item".to_string()],
            }),
            Some(item) => match item_errors(item) {
                Some(errors) => Err(errors),
                None => Ok(success(index)),
            },
        })
        .collect()
}

fn item_errors(item: &Value) -> Option<ObjectErrors> {
    let errors = item.pointer("/result/errors/error")?.as_array()?;
    let messages: Vec<String> = errors
        .iter()
        .map(|error| {
            error
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string)
        })
        .collect();
    (!messages.is_empty()).then_some(ObjectErrors { messages })
}

fn report_failures<T>(outcomes: &[std::result::Result<T, ObjectErrors>], kind: &str) {
    let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();
    if failed > 0 {
        warn!(failed, total = outcomes.len(), kind, "Batch partially failed");
    }
}
