// SPDX-License-Identifier: PMPL-1.0-or-later
//! In-memory stand-in for a Weaviate deployment.
//!
//! Implements the REST routes and the gRPC search the client uses, with the
//! remote's observable quirks: property names are stored with a lower-case
//! first letter, objects are partitioned per tenant, and search metadata is
//! always returned in full so the client has to mask what was not requested.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prost_types::value::Kind;
use serde_json::{json, Map, Value};
use uuid::Uuid;
use weaviate_client::proto::{
    ResultAdditionalProps, ResultProperties, ReturnRefProperties, SearchReply, SearchRequest, SearchResult,
};
use weaviate_client::{Connection, RawResponse, Result};

#[derive(Debug, Clone)]
struct Stored {
    id: Uuid,
    properties: Map<String, Value>,
    vector: Option<Vec<f32>>,
    created: i64,
    updated: i64,
}

type Partition = (String, Option<String>);

#[derive(Default)]
struct State {
    classes: BTreeMap<String, Value>,
    tenants: BTreeMap<String, BTreeSet<String>>,
    objects: BTreeMap<Partition, Vec<Stored>>,
    rejected: HashSet<Uuid>,
    requests: Vec<String>,
    searches: Vec<SearchRequest>,
    clock: i64,
}

#[derive(Default)]
pub struct FakeWeaviate {
    state: Mutex<State>,
}

impl FakeWeaviate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make batch inserts fail for this object.
    pub fn reject(&self, id: Uuid) {
        self.state.lock().unwrap().rejected.insert(id);
    }

    /// Every REST request so far, as `METHOD /path?query`.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_search(&self) -> Option<SearchRequest> {
        self.state.lock().unwrap().searches.last().cloned()
    }

    /// Register a class directly, bypassing the client.
    pub fn seed_class(&self, class: Value) {
        let name = class["class"].as_str().unwrap().to_string();
        self.state.lock().unwrap().classes.insert(name, class);
    }

    pub fn stored_properties(&self, class: &str, tenant: Option<&str>, id: Uuid) -> Option<Map<String, Value>> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(class.to_string(), tenant.map(str::to_string)))?
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.properties.clone())
    }

    fn handle(&self, method: &str, path: &str, body: Option<&Value>) -> RawResponse {
        let mut state = self.state.lock().unwrap();
        state.requests.push(format!("{method} {path}"));

        let (route, query) = path.split_once('?').unwrap_or((path, ""));
        let params: BTreeMap<String, String> = url::form_urlencoded::parse(query.as_bytes()).into_owned().collect();
        let tenant = params.get("tenant").cloned();
        let segments: Vec<&str> = route.trim_start_matches("/v1/").split('/').collect();
        let body = body.cloned().unwrap_or(Value::Null);

        match (method, segments.as_slice()) {
            ("POST", ["schema"]) => state.create_class(body),
            ("GET", ["schema", class]) => match state.classes.get(*class) {
                Some(definition) => ok(definition.clone()),
                None => not_found(),
            },
            ("DELETE", ["schema", class]) => {
                state.classes.remove(*class);
                state.tenants.remove(*class);
                state.objects.retain(|(c, _), _| c != class);
                ok(Value::Null)
            }
            ("POST", ["schema", class, "tenants"]) => {
                let names = body.as_array().into_iter().flatten().filter_map(|t| t["name"].as_str());
                let names: Vec<String> = names.map(str::to_string).collect();
                state.tenants.entry(class.to_string()).or_default().extend(names);
                ok(body)
            }
            ("GET", ["schema", class, "tenants"]) => {
                let tenants = state.tenants.get(*class).cloned().unwrap_or_default();
                ok(Value::Array(tenants.into_iter().map(|name| json!({ "name": name })).collect()))
            }
            ("DELETE", ["schema", class, "tenants"]) => {
                if let Some(tenants) = state.tenants.get_mut(*class) {
                    for name in body.as_array().into_iter().flatten().filter_map(Value::as_str) {
                        tenants.remove(name);
                    }
                }
                ok(Value::Null)
            }
            ("POST", ["objects"]) => match state.insert(&body) {
                Ok(()) => ok(body),
                Err(message) => unprocessable(&message),
            },
            ("GET", ["objects"]) => {
                let class = params.get("class").cloned().unwrap_or_default();
                let include_vector = params.get("include").map(String::as_str) == Some("vector");
                let objects = state
                    .objects
                    .get(&(class.clone(), tenant.clone()))
                    .cloned()
                    .unwrap_or_default();
                let objects: Vec<Value> = objects
                    .iter()
                    .map(|o| rest_object(&class, tenant.as_deref(), o, include_vector))
                    .collect();
                ok(json!({ "objects": objects, "totalResults": objects.len() }))
            }
            (_, ["objects", class, id]) => {
                let Ok(id) = Uuid::parse_str(id) else {
                    return unprocessable("malformed id");
                };
                let include_vector = params.get("include").map(String::as_str) == Some("vector");
                // Writes name the tenant in the body, reads in the query string.
                let tenant = tenant.or_else(|| body["tenant"].as_str().map(str::to_string));
                state.object_route(method, class, tenant, id, &body, include_vector)
            }
            (_, ["objects", class, id, "references", property]) => {
                let Ok(id) = Uuid::parse_str(id) else {
                    return unprocessable("malformed id");
                };
                state.reference_route(method, class, tenant, id, property, &body)
            }
            ("POST", ["batch", "objects"]) => {
                let objects = body["objects"].as_array().cloned().unwrap_or_default();
                let results = objects
                    .into_iter()
                    .map(|object| {
                        let id = object["id"].as_str().and_then(|id| Uuid::parse_str(id).ok());
                        let outcome = match id {
                            Some(id) if state.rejected.contains(&id) => Err("rejected by fake".to_string()),
                            _ => state.insert(&object),
                        };
                        let mut item = object;
                        item["result"] = match outcome {
                            Ok(()) => json!({}),
                            Err(message) => json!({ "errors": { "error": [{ "message": message }] } }),
                        };
                        item
                    })
                    .collect();
                ok(Value::Array(results))
            }
            ("POST", ["batch", "references"]) => {
                let links = body.as_array().cloned().unwrap_or_default();
                let results = links
                    .into_iter()
                    .map(|link| {
                        let outcome = state.batch_link(&link);
                        let mut item = link;
                        item["result"] = match outcome {
                            Ok(()) => json!({ "status": "SUCCESS" }),
                            Err(message) => {
                                json!({ "status": "FAILED", "errors": { "error": [{ "message": message }] } })
                            }
                        };
                        item
                    })
                    .collect();
                ok(Value::Array(results))
            }
            _ => not_found(),
        }
    }
}

impl State {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn multi_tenant(&self, class: &str) -> bool {
        self.classes
            .get(class)
            .and_then(|c| c.pointer("/multiTenancyConfig/enabled"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn check_tenant(&self, class: &str, tenant: Option<&str>) -> std::result::Result<(), String> {
        if !self.classes.contains_key(class) {
            return Err(format!("class {class} not found"));
        }
        match (self.multi_tenant(class), tenant) {
            (true, None) => Err(format!("class {class} has multi-tenancy enabled, but request was without tenant")),
            (true, Some(tenant)) if !self.tenants.get(class).is_some_and(|t| t.contains(tenant)) => {
                Err(format!("tenant not found: {tenant}"))
            }
            (false, Some(_)) => Err(format!("class {class} has multi-tenancy disabled")),
            _ => Ok(()),
        }
    }

    fn create_class(&mut self, mut definition: Value) -> RawResponse {
        let Some(name) = definition["class"].as_str().map(str::to_string) else {
            return unprocessable("class name missing");
        };
        if self.classes.contains_key(&name) {
            return unprocessable(&format!("class name {name} already exists"));
        }
        if let Some(properties) = definition["properties"].as_array_mut() {
            for property in properties {
                let stored = lower_first(property["name"].as_str().unwrap_or_default());
                property["name"] = Value::String(stored);
                property["indexFilterable"] = json!(true);
            }
        }
        self.classes.insert(name, definition.clone());
        ok(definition)
    }

    fn insert(&mut self, object: &Value) -> std::result::Result<(), String> {
        let class = object["class"].as_str().unwrap_or_default().to_string();
        let tenant = object["tenant"].as_str().map(str::to_string);
        self.check_tenant(&class, tenant.as_deref())?;
        let id = object["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or("missing id")?;

        let now = self.tick();
        let partition = self.objects.entry((class, tenant)).or_default();
        if partition.iter().any(|o| o.id == id) {
            return Err(format!("id '{id}' already exists"));
        }
        partition.push(Stored {
            id,
            properties: object["properties"].as_object().cloned().unwrap_or_default(),
            vector: serde_json::from_value(object["vector"].clone()).ok(),
            created: now,
            updated: now,
        });
        Ok(())
    }

    fn object_route(
        &mut self,
        method: &str,
        class: &str,
        tenant: Option<String>,
        id: Uuid,
        body: &Value,
        include_vector: bool,
    ) -> RawResponse {
        if let Err(message) = self.check_tenant(class, tenant.as_deref()) {
            return unprocessable(&message);
        }
        let now = self.tick();
        let Some(stored) = self
            .objects
            .get_mut(&(class.to_string(), tenant.clone()))
            .and_then(|objects| objects.iter_mut().find(|o| o.id == id))
        else {
            return not_found();
        };

        match method {
            "GET" => ok(rest_object(class, tenant.as_deref(), stored, include_vector)),
            "PUT" => {
                stored.properties = body["properties"].as_object().cloned().unwrap_or_default();
                stored.vector = serde_json::from_value(body["vector"].clone()).ok();
                stored.updated = now;
                ok(body.clone())
            }
            "PATCH" => {
                for (name, value) in body["properties"].as_object().cloned().unwrap_or_default() {
                    stored.properties.insert(name, value);
                }
                stored.updated = now;
                RawResponse::new(204, Value::Null)
            }
            _ => RawResponse::new(405, Value::Null),
        }
    }

    fn reference_route(
        &mut self,
        method: &str,
        class: &str,
        tenant: Option<String>,
        id: Uuid,
        property: &str,
        body: &Value,
    ) -> RawResponse {
        if let Err(message) = self.check_tenant(class, tenant.as_deref()) {
            return unprocessable(&message);
        }
        let Some(stored) = self
            .objects
            .get_mut(&(class.to_string(), tenant))
            .and_then(|objects| objects.iter_mut().find(|o| o.id == id))
        else {
            return not_found();
        };

        let slot = stored.properties.entry(property.to_string()).or_insert(Value::Null);
        let mut links = slot.as_array().cloned().unwrap_or_default();
        match method {
            "POST" => links.push(body.clone()),
            "PUT" => links = body.as_array().cloned().unwrap_or_default(),
            "DELETE" => {
                let target = beacon_id(body);
                links.retain(|link| beacon_id(link) != target);
            }
            _ => return RawResponse::new(405, Value::Null),
        }
        *slot = Value::Array(links);
        ok(body.clone())
    }

    fn batch_link(&mut self, link: &Value) -> std::result::Result<(), String> {
        let from = link["from"].as_str().ok_or("missing from")?;
        let to = link["to"].as_str().ok_or("missing to")?;
        let tenant = link["tenant"].as_str().map(str::to_string);

        // weaviate://localhost/<Class>/<id>/<property>
        let parts: Vec<&str> = from.trim_start_matches("weaviate://").split('/').collect();
        let [_, class, id, property] = parts.as_slice() else {
            return Err(format!("malformed source beacon {from}"));
        };
        let id = Uuid::parse_str(id).map_err(|e| e.to_string())?;
        let stored = self
            .objects
            .get_mut(&(class.to_string(), tenant))
            .and_then(|objects| objects.iter_mut().find(|o| o.id == id))
            .ok_or_else(|| format!("source object {id} not found"))?;

        let links = stored
            .properties
            .entry(property.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match links {
            Value::Array(links) => links.push(json!({ "beacon": to })),
            other => *other = json!([{ "beacon": to }]),
        }
        Ok(())
    }

    fn find(&self, tenant: &Option<String>, id: Uuid) -> Option<&Stored> {
        self.objects
            .iter()
            .filter(|((_, t), _)| t == tenant)
            .flat_map(|(_, objects)| objects.iter())
            .find(|o| o.id == id)
    }

    fn search(&mut self, request: SearchRequest) -> std::result::Result<SearchReply, tonic::Status> {
        self.searches.push(request.clone());
        let class = request.class_name.clone();
        self.check_tenant(&class, request.tenant.as_deref())
            .map_err(tonic::Status::invalid_argument)?;

        let objects = self
            .objects
            .get(&(class, request.tenant.clone()))
            .cloned()
            .unwrap_or_default();

        let mut hits: Vec<(Stored, Option<f32>, Option<f32>)> = match (&request.bm25_search, &request.near_vector) {
            (Some(bm25), _) => {
                let needle = bm25.query.to_lowercase();
                objects
                    .into_iter()
                    .filter(|o| {
                        o.properties.iter().any(|(name, value)| {
                            (bm25.properties.is_empty() || bm25.properties.contains(name))
                                && text_values(value).any(|text| text.to_lowercase().contains(&needle))
                        })
                    })
                    .map(|o| (o, Some(1.0), None))
                    .collect()
            }
            (None, Some(near)) => {
                let mut hits: Vec<_> = objects
                    .into_iter()
                    .filter_map(|o| {
                        let distance = o.vector.as_ref().map(|v| {
                            v.iter().zip(&near.vector).map(|(a, b)| (a - b) * (a - b)).sum::<f32>()
                        })?;
                        Some((o, None::<f32>, Some(distance)))
                    })
                    .collect();
                hits.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap());
                hits
            }
            (None, None) => objects.into_iter().map(|o| (o, None, None)).collect(),
        };
        if let Some(limit) = request.limit {
            hits.truncate(limit as usize);
        }

        let requested = request.properties.clone().unwrap_or_default();
        let results = hits
            .iter()
            .map(|(stored, score, distance)| SearchResult {
                properties: Some(self.result_properties(stored, &requested, &request.tenant)),
                additional_properties: Some(additional(stored, *score, *distance)),
            })
            .collect();
        Ok(SearchReply { results, took: 0.5 })
    }

    fn result_properties(
        &self,
        stored: &Stored,
        requested: &weaviate_client::proto::Properties,
        tenant: &Option<String>,
    ) -> ResultProperties {
        let plain: Map<String, Value> = requested
            .non_ref_properties
            .iter()
            .filter_map(|name| stored.properties.get(name).map(|v| (name.clone(), v.clone())))
            .collect();

        let ref_props = requested
            .ref_properties
            .iter()
            .map(|reference| {
                let linked_request = reference.linked_properties.clone().unwrap_or_default();
                let links = stored
                    .properties
                    .get(&reference.reference_property)
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let properties = links
                    .iter()
                    .filter_map(|link| Uuid::parse_str(&beacon_id(link)).ok())
                    .filter_map(|id| self.find(tenant, id))
                    .map(|linked| {
                        let mut nested = self.result_properties(linked, &linked_request, tenant);
                        nested.metadata = Some(additional(linked, None, None));
                        nested
                    })
                    .collect();
                ReturnRefProperties {
                    properties,
                    prop_name: reference.reference_property.clone(),
                }
            })
            .collect();

        ResultProperties {
            non_ref_properties: Some(to_struct(plain)),
            ref_props,
            class_name: String::new(),
            metadata: None,
        }
    }
}

#[async_trait]
impl Connection for FakeWeaviate {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        Ok(self.handle("GET", path, None))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse> {
        Ok(self.handle("POST", path, Some(body)))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<RawResponse> {
        Ok(self.handle("PUT", path, Some(body)))
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<RawResponse> {
        Ok(self.handle("PATCH", path, Some(body)))
    }

    async fn delete(&self, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        Ok(self.handle("DELETE", path, body))
    }

    async fn search(&self, request: tonic::Request<SearchRequest>) -> std::result::Result<SearchReply, tonic::Status> {
        self.state.lock().unwrap().search(request.into_inner())
    }

    fn current_bearer_token(&self) -> String {
        String::new()
    }
}

fn ok(body: Value) -> RawResponse {
    RawResponse::new(200, body)
}

fn not_found() -> RawResponse {
    RawResponse::new(404, Value::Null)
}

fn unprocessable(message: &str) -> RawResponse {
    RawResponse::new(422, json!({ "error": [{ "message": message }] }))
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn beacon_id(link: &Value) -> String {
    let uri = link["beacon"].as_str().unwrap_or_default();
    uri.rsplit('/').next().unwrap_or_default().to_string()
}

fn text_values(value: &Value) -> Box<dyn Iterator<Item = &str> + '_> {
    match value {
        Value::String(text) => Box::new(std::iter::once(text.as_str())),
        Value::Array(items) => Box::new(items.iter().filter_map(Value::as_str)),
        _ => Box::new(std::iter::empty()),
    }
}

fn rest_object(class: &str, tenant: Option<&str>, stored: &Stored, include_vector: bool) -> Value {
    let mut object = json!({
        "class": class,
        "id": stored.id,
        "properties": stored.properties,
        "creationTimeUnix": stored.created,
        "lastUpdateTimeUnix": stored.updated,
    });
    if let Some(tenant) = tenant {
        object["tenant"] = json!(tenant);
    }
    if include_vector {
        object["vector"] = json!(stored.vector.clone().unwrap_or_default());
    }
    object
}

fn additional(stored: &Stored, score: Option<f32>, distance: Option<f32>) -> ResultAdditionalProps {
    ResultAdditionalProps {
        id: stored.id.to_string(),
        vector: stored.vector.clone().unwrap_or_default(),
        creation_time_unix: stored.created,
        creation_time_unix_present: true,
        last_update_time_unix: stored.updated,
        last_update_time_unix_present: true,
        distance: distance.unwrap_or_default(),
        distance_present: distance.is_some(),
        certainty: 0.0,
        certainty_present: false,
        score: score.unwrap_or_default(),
        score_present: score.is_some(),
        explain_score: String::new(),
        explain_score_present: false,
    }
}

fn to_struct(map: Map<String, Value>) -> prost_types::Struct {
    prost_types::Struct {
        fields: map.into_iter().map(|(name, value)| (name, to_value(value))).collect(),
    }
}

fn to_value(value: Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(flag) => Kind::BoolValue(flag),
        Value::Number(number) => Kind::NumberValue(number.as_f64().unwrap_or_default()),
        Value::String(text) => Kind::StringValue(text),
        Value::Array(items) => Kind::ListValue(prost_types::ListValue {
            values: items.into_iter().map(to_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(to_struct(map)),
    };
    prost_types::Value { kind: Some(kind) }
}
