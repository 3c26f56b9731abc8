// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! gRPC search: query values and result-tree reconstruction.
//!
//! A [`Query`] is an immutable value. Every combinator consumes it and returns
//! the next one, and the terminal [`Query::fetch`] consumes it for good, so a
//! query can never be executed twice. Exactly one search mode is active;
//! selecting a mode replaces the previous one.
//!
//! ```rust,no_run
//! # use weaviate_client::{Collection, LinkTo, MetadataQuery, Bm25};
//! # async fn demo(articles: Collection<weaviate_model::DynamicProperties>) -> weaviate_client::Result<()> {
//! let rows = articles
//!     .query()
//!     .bm25(Bm25::new("rust"))
//!     .limit(10)
//!     .return_properties(["title"])
//!     .return_reference(LinkTo::new("group").property("name").metadata(MetadataQuery::all()))
//!     .return_metadata(MetadataQuery { score: true, ..Default::default() })
//!     .fetch()
//!     .await?;
//! for row in rows {
//!     println!("{:?} {:?}", row.properties.get("title"), row.metadata.score);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use prost_types::value::Kind;
use serde_json::{Map, Number, Value};
use tonic::metadata::MetadataValue;
use tracing::{debug, instrument};
use uuid::Uuid;
use weaviate_model::{decode_properties, Metadata, Model, Properties};

use crate::connection::Connection;
use crate::error::{Result, WeaviateError};
use crate::proto;
use crate::proto::hybrid_search_params::FusionType;

/// Which metadata fields to return. Unrequested fields always come back as
/// `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MetadataQuery {
    pub uuid: bool,
    pub vector: bool,
    pub creation_time_unix: bool,
    pub last_update_time_unix: bool,
    pub distance: bool,
    pub certainty: bool,
    pub score: bool,
    pub explain_score: bool,
}

impl MetadataQuery {
    /// Request every metadata field.
    pub fn all() -> Self {
        Self {
            uuid: true,
            vector: true,
            creation_time_unix: true,
            last_update_time_unix: true,
            distance: true,
            certainty: true,
            score: true,
            explain_score: true,
        }
    }

    fn to_grpc(self) -> proto::AdditionalProperties {
        proto::AdditionalProperties {
            uuid: self.uuid,
            vector: self.vector,
            creation_time_unix: self.creation_time_unix,
            last_update_time_unix: self.last_update_time_unix,
            distance: self.distance,
            certainty: self.certainty,
            score: self.score,
            explain_score: self.explain_score,
        }
    }

    /// Read the requested fields, each only when its presence flag is set.
    fn extract(self, returned: &proto::ResultAdditionalProps) -> Metadata {
        Metadata {
            uuid: self.uuid.then(|| Uuid::parse_str(&returned.id).ok()).flatten(),
            vector: (self.vector && !returned.vector.is_empty()).then(|| returned.vector.clone()),
            creation_time_unix: (self.creation_time_unix && returned.creation_time_unix_present)
                .then_some(returned.creation_time_unix),
            last_update_time_unix: (self.last_update_time_unix && returned.last_update_time_unix_present)
                .then_some(returned.last_update_time_unix),
            distance: (self.distance && returned.distance_present).then_some(returned.distance),
            certainty: (self.certainty && returned.certainty_present).then_some(returned.certainty),
            score: (self.score && returned.score_present).then_some(returned.score),
            explain_score: (self.explain_score && returned.explain_score_present)
                .then(|| returned.explain_score.clone()),
        }
    }
}

fn extract_metadata(request: Option<MetadataQuery>, returned: Option<&proto::ResultAdditionalProps>) -> Metadata {
    match (request, returned) {
        (Some(request), Some(returned)) => request.extract(returned),
        _ => Metadata::default(),
    }
}

/// One entry of the requested property set.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnProperty {
    /// A non-reference property, by name.
    Plain(String),
    Reference(LinkTo),
}

impl From<&str> for ReturnProperty {
    fn from(name: &str) -> Self {
        ReturnProperty::Plain(name.to_string())
    }
}

impl From<String> for ReturnProperty {
    fn from(name: String) -> Self {
        ReturnProperty::Plain(name)
    }
}

impl From<LinkTo> for ReturnProperty {
    fn from(link: LinkTo) -> Self {
        ReturnProperty::Reference(link)
    }
}

/// Projection through a reference property: which properties and metadata
/// of the linked objects to return. Projections nest.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTo {
    /// Reference property on the queried collection.
    pub link_on: String,
    /// Projection applied to the linked objects.
    pub properties: Vec<ReturnProperty>,
    /// Metadata requested for the linked objects.
    pub metadata: MetadataQuery,
}

impl LinkTo {
    /// Follow `link_on` with an empty projection.
    pub fn new(link_on: impl Into<String>) -> Self {
        Self {
            link_on: link_on.into(),
            properties: Vec::new(),
            metadata: MetadataQuery::default(),
        }
    }

    /// Add one property to the linked projection.
    pub fn property(mut self, property: impl Into<ReturnProperty>) -> Self {
        add_property(&mut self.properties, property.into());
        self
    }

    pub fn properties<I, T>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ReturnProperty>,
    {
        properties.into_iter().fold(self, LinkTo::property)
    }

    pub fn metadata(mut self, metadata: MetadataQuery) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Insert into an ordered set. A second projection through the same
/// reference replaces the first.
fn add_property(properties: &mut Vec<ReturnProperty>, property: ReturnProperty) {
    let existing = properties.iter().position(|p| match (p, &property) {
        (ReturnProperty::Plain(a), ReturnProperty::Plain(b)) => a == b,
        (ReturnProperty::Reference(a), ReturnProperty::Reference(b)) => a.link_on == b.link_on,
        _ => false,
    });
    match existing {
        Some(index) => properties[index] = property,
        None => properties.push(property),
    }
}

fn to_grpc_properties(properties: &[ReturnProperty]) -> proto::Properties {
    let mut grpc = proto::Properties::default();
    for property in properties {
        match property {
            ReturnProperty::Plain(name) => grpc.non_ref_properties.push(name.clone()),
            ReturnProperty::Reference(link) => grpc.ref_properties.push(proto::RefProperties {
                reference_property: link.link_on.clone(),
                linked_properties: Some(to_grpc_properties(&link.properties)),
                metadata: Some(link.metadata.to_grpc()),
            }),
        }
    }
    grpc
}

// ---------------------------------------------------------------------------
// Search modes
// ---------------------------------------------------------------------------

/// Keyword search over text properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Bm25 {
    pub query: String,
    pub properties: Vec<String>,
}

impl Bm25 {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            properties: Vec::new(),
        }
    }

    /// Restrict the search to these properties.
    pub fn properties<I, T>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }
}

/// How keyword and vector rankings are merged in a hybrid search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridFusion {
    Ranked,
    RelativeScore,
}

impl HybridFusion {
    fn to_grpc(self) -> FusionType {
        match self {
            HybridFusion::Ranked => FusionType::Ranked,
            HybridFusion::RelativeScore => FusionType::RelativeScore,
        }
    }
}

/// Keyword plus vector search.
#[derive(Debug, Clone, PartialEq)]
pub struct Hybrid {
    pub query: String,
    pub alpha: Option<f32>,
    pub vector: Option<Vec<f32>>,
    pub properties: Vec<String>,
    pub fusion: Option<HybridFusion>,
}

impl Hybrid {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            alpha: None,
            vector: None,
            properties: Vec::new(),
            fusion: None,
        }
    }

    /// Weight of the vector ranking, 0 (keyword only) to 1 (vector only).
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }

    pub fn properties<I, T>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn fusion(mut self, fusion: HybridFusion) -> Self {
        self.fusion = Some(fusion);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearVector {
    pub vector: Vec<f32>,
    pub certainty: Option<f64>,
    pub distance: Option<f64>,
}

impl NearVector {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            certainty: None,
            distance: None,
        }
    }

    pub fn certainty(mut self, certainty: f64) -> Self {
        self.certainty = Some(certainty);
        self
    }

    pub fn distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearObject {
    pub id: Uuid,
    pub certainty: Option<f64>,
    pub distance: Option<f64>,
}

impl NearObject {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            certainty: None,
            distance: None,
        }
    }

    pub fn certainty(mut self, certainty: f64) -> Self {
        self.certainty = Some(certainty);
        self
    }

    pub fn distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }
}

/// Active search mode of a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchMode {
    /// Plain listing, optionally paged with `offset` or `after`.
    #[default]
    Get,
    Bm25(Bm25),
    Hybrid(Hybrid),
    NearVector(NearVector),
    NearObject(NearObject),
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One result row: plain properties verbatim, linked objects per reference
/// property, and the requested metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub properties: Map<String, Value>,
    pub references: BTreeMap<String, Vec<QueryResult>>,
    pub metadata: Metadata,
}

impl QueryResult {
    /// Decode into the property payload of `model`.
    ///
    /// Reference fields are filled from the identifiers of the linked objects,
    /// so a reference must be projected with `uuid` metadata to be populated.
    /// [`Query::fetch_objects`] requests it for every reference projection.
    ///
    /// # Errors
    ///
    /// Returns [`WeaviateError::Validation`] when the row does not decode
    /// into `P`.
    pub fn into_object<P: Properties>(self, model: &Model) -> Result<QueryObject<P>> {
        let mut properties = self.properties;
        for descriptor in model.reference_properties() {
            if let Some(linked) = self.references.get(descriptor.name()) {
                let ids = linked
                    .iter()
                    .filter_map(|row| row.metadata.uuid)
                    .map(|id| Value::String(id.to_string()))
                    .collect();
                properties.insert(descriptor.name().to_string(), Value::Array(ids));
            }
        }

        let properties = P::from_properties(decode_properties(properties, model)?, model)?;
        Ok(QueryObject {
            properties,
            references: self.references,
            metadata: self.metadata,
        })
    }
}

/// Typed result row.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryObject<P> {
    /// Decoded property payload.
    pub properties: P,
    /// Linked rows keyed by reference property, as projected.
    pub references: BTreeMap<String, Vec<QueryResult>>,
    pub metadata: Metadata,
}

/// Metadata request per reference, mirroring the shape of the projections.
#[derive(Debug, Clone, Default)]
struct Projection {
    metadata: Option<MetadataQuery>,
    references: BTreeMap<String, Projection>,
}

impl Projection {
    fn new(properties: &[ReturnProperty], metadata: Option<MetadataQuery>) -> Self {
        let references = properties
            .iter()
            .filter_map(|property| match property {
                ReturnProperty::Reference(link) => Some((
                    link.link_on.clone(),
                    Projection::new(&link.properties, Some(link.metadata)),
                )),
                ReturnProperty::Plain(_) => None,
            })
            .collect();
        Self { metadata, references }
    }
}

/// Rebuild result rows from a search reply, in reply order.
pub fn build_result_tree(
    reply: proto::SearchReply,
    properties: &[ReturnProperty],
    metadata: Option<MetadataQuery>,
) -> Vec<QueryResult> {
    let projection = Projection::new(properties, metadata);
    reply
        .results
        .into_iter()
        .map(|result| {
            let mut row = result
                .properties
                .map(|returned| decode_row(returned, &projection))
                .unwrap_or_default();
            row.metadata = extract_metadata(projection.metadata, result.additional_properties.as_ref());
            row
        })
        .collect()
}

fn decode_row(returned: proto::ResultProperties, projection: &Projection) -> QueryResult {
    let unprojected = Projection::default();
    let mut row = QueryResult {
        properties: returned.non_ref_properties.map(struct_to_json).unwrap_or_default(),
        ..QueryResult::default()
    };

    for reference in returned.ref_props {
        let nested = projection.references.get(&reference.prop_name).unwrap_or(&unprojected);
        let linked = reference
            .properties
            .into_iter()
            .map(|mut linked| {
                let returned_metadata = linked.metadata.take();
                let mut child = decode_row(linked, nested);
                child.metadata = extract_metadata(nested.metadata, returned_metadata.as_ref());
                child
            })
            .collect();
        row.references.insert(reference.prop_name, linked);
    }
    row
}

fn struct_to_json(value: prost_types::Struct) -> Map<String, Value> {
    value.fields.into_iter().map(|(name, value)| (name, to_json(value))).collect()
}

fn to_json(value: prost_types::Value) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::NumberValue(number)) => Number::from_f64(number).map_or(Value::Null, Value::Number),
        Some(Kind::StringValue(text)) => Value::String(text),
        Some(Kind::BoolValue(flag)) => Value::Bool(flag),
        Some(Kind::StructValue(nested)) => Value::Object(struct_to_json(nested)),
        Some(Kind::ListValue(list)) => Value::Array(list.values.into_iter().map(to_json).collect()),
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Search over one collection, optionally scoped to a tenant.
pub struct Query<P> {
    connection: Arc<dyn Connection>,
    model: Arc<Model>,
    tenant: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
    after: Option<Uuid>,
    autocut: Option<u32>,
    mode: SearchMode,
    properties: Vec<ReturnProperty>,
    metadata: Option<MetadataQuery>,
    _payload: PhantomData<fn() -> P>,
}

impl<P> Query<P> {
    pub(crate) fn new(connection: Arc<dyn Connection>, model: Arc<Model>, tenant: Option<String>) -> Self {
        Self {
            connection,
            model,
            tenant,
            limit: None,
            offset: None,
            after: None,
            autocut: None,
            mode: SearchMode::Get,
            properties: Vec::new(),
            metadata: None,
            _payload: PhantomData,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Cursor paging: start after this object.
    pub fn after(mut self, after: Uuid) -> Self {
        self.after = Some(after);
        self
    }

    /// Cut the result list after this many jumps in the score curve.
    pub fn autocut(mut self, autocut: u32) -> Self {
        self.autocut = Some(autocut);
        self
    }

    pub fn return_property(mut self, property: impl Into<ReturnProperty>) -> Self {
        add_property(&mut self.properties, property.into());
        self
    }

    pub fn return_properties<I, T>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ReturnProperty>,
    {
        properties.into_iter().fold(self, Query::return_property)
    }

    pub fn return_reference(self, link: LinkTo) -> Self {
        self.return_property(link)
    }

    pub fn return_metadata(mut self, metadata: MetadataQuery) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Plain listing.
    pub fn get(self) -> Self {
        self.mode(SearchMode::Get)
    }

    pub fn bm25(self, search: Bm25) -> Self {
        self.mode(SearchMode::Bm25(search))
    }

    pub fn hybrid(self, search: Hybrid) -> Self {
        self.mode(SearchMode::Hybrid(search))
    }

    pub fn near_vector(self, search: NearVector) -> Self {
        self.mode(SearchMode::NearVector(search))
    }

    pub fn near_object(self, search: NearObject) -> Self {
        self.mode(SearchMode::NearObject(search))
    }

    pub fn mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn search_mode(&self) -> &SearchMode {
        &self.mode
    }

    /// The request [`Query::fetch`] would send.
    pub fn to_request(&self) -> proto::SearchRequest {
        let mut request = proto::SearchRequest {
            class_name: self.model.name().to_string(),
            limit: self.limit,
            offset: self.offset,
            autocut: self.autocut,
            after: self.after.map(|id| id.to_string()).unwrap_or_default(),
            tenant: self.tenant.clone(),
            properties: Some(to_grpc_properties(&self.properties)),
            additional_properties: self.metadata.map(MetadataQuery::to_grpc),
            ..proto::SearchRequest::default()
        };

        match &self.mode {
            SearchMode::Get => {}
            SearchMode::Bm25(search) => {
                request.bm25_search = Some(proto::Bm25SearchParams {
                    query: search.query.clone(),
                    properties: search.properties.clone(),
                });
            }
            SearchMode::Hybrid(search) => {
                request.hybrid_search = Some(proto::HybridSearchParams {
                    query: search.query.clone(),
                    properties: search.properties.clone(),
                    vector: search.vector.clone().unwrap_or_default(),
                    alpha: search.alpha,
                    fusion_type: search.fusion.map_or(FusionType::Unspecified, HybridFusion::to_grpc) as i32,
                });
            }
            SearchMode::NearVector(search) => {
                request.near_vector = Some(proto::NearVectorParams {
                    vector: search.vector.clone(),
                    certainty: search.certainty,
                    distance: search.distance,
                });
            }
            SearchMode::NearObject(search) => {
                request.near_object = Some(proto::NearObjectParams {
                    id: search.id.to_string(),
                    certainty: search.certainty,
                    distance: search.distance,
                });
            }
        }
        request
    }

    /// Run the search: one gRPC call, all rows or an error.
    ///
    /// # Errors
    ///
    /// Returns [`WeaviateError::SearchExecution`] with the remote's message
    /// when the call fails, e.g. for a tenant that does not exist.
    #[instrument(skip(self), fields(class = %self.model.name(), tenant = ?self.tenant))]
    pub async fn fetch(self) -> Result<Vec<QueryResult>> {
        let mut request = tonic::Request::new(self.to_request());

        let token = self.connection.current_bearer_token();
        if !token.is_empty() {
            let value = MetadataValue::try_from(format!("Bearer {token}"))
                .map_err(|_| WeaviateError::InvalidConfig("bearer token is not a valid header value".into()))?;
            request.metadata_mut().insert("authorization", value);
        }

        let reply = self
            .connection
            .search(request)
            .await
            .map_err(|status| WeaviateError::SearchExecution(status.message().to_string()))?;
        debug!(results = reply.results.len(), took = reply.took, "Search completed");

        Ok(build_result_tree(reply, &self.properties, self.metadata))
    }
}

impl<P: Properties> Query<P> {
    /// Run the search and decode every row into `P`.
    ///
    /// When no plain property was named, all plain properties of the model
    /// are requested alongside any references. Reference projections always
    /// ask for the linked uuid, since that is what a reference field holds.
    pub async fn fetch_objects(self) -> Result<Vec<QueryObject<P>>> {
        let model = Arc::clone(&self.model);
        let mut query = self;
        if !query.properties.iter().any(|p| matches!(p, ReturnProperty::Plain(_))) {
            for property in model.plain_properties() {
                add_property(&mut query.properties, ReturnProperty::Plain(property.name().to_string()));
            }
        }
        for property in &mut query.properties {
            if let ReturnProperty::Reference(link) = property {
                link.metadata.uuid = true;
            }
        }

        query
            .fetch()
            .await?
            .into_iter()
            .map(|row| row.into_object(&model))
            .collect()
    }
}
