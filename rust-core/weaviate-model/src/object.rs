// SPDX-License-Identifier: PMPL-1.0-or-later
//! Objects: built-in identifier and vector around a property payload.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::identifier::normalize_uuid;

/// Which fields have been explicitly provided.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExplicitFields {
    All,
    Only(BTreeSet<String>),
}

/// One object of a collection.
///
/// An object built with [`Object::new`] counts every field as provided. One
/// built with [`Object::partial`] counts only the fields touched through
/// [`Object::set`] or [`Object::mark_set`]; partial updates send nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct Object<P> {
    pub uuid: Uuid,
    /// Client-supplied vector; `None` lets the remote vectorize.
    pub vector: Option<Vec<f32>>,
    pub properties: P,
    explicit: ExplicitFields,
}

impl<P> Object<P> {
    /// A fully provided object with a fresh random identifier.
    pub fn new(properties: P) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            vector: None,
            properties,
            explicit: ExplicitFields::All,
        }
    }

    /// An object whose fields all count as not provided yet.
    pub fn partial(properties: P) -> Self {
        Self {
            explicit: ExplicitFields::Only(BTreeSet::new()),
            ..Self::new(properties)
        }
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    /// Identify the object by a natural key (or a UUID string).
    pub fn with_key(mut self, key: &str) -> Self {
        self.uuid = normalize_uuid(key);
        self
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }

    /// Modify the payload and record `field` as provided.
    pub fn set<F: FnOnce(&mut P)>(&mut self, field: &str, apply: F) {
        apply(&mut self.properties);
        self.mark_set(field);
    }

    /// Record `field` as provided without touching the payload.
    pub fn mark_set(&mut self, field: &str) {
        if let ExplicitFields::Only(fields) = &mut self.explicit {
            fields.insert(field.to_string());
        }
    }

    pub fn is_set(&self, field: &str) -> bool {
        match &self.explicit {
            ExplicitFields::All => true,
            ExplicitFields::Only(fields) => fields.contains(field),
        }
    }

    /// Replace the payload, keeping identity, vector and provided fields.
    pub fn map<Q, F: FnOnce(P) -> Q>(self, f: F) -> Object<Q> {
        Object {
            uuid: self.uuid,
            vector: self.vector,
            properties: f(self.properties),
            explicit: self.explicit,
        }
    }
}

/// Descriptive fields returned alongside an object.
///
/// A field is `None` unless it was requested and the remote returned it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub uuid: Option<Uuid>,
    pub vector: Option<Vec<f32>>,
    pub creation_time_unix: Option<i64>,
    pub last_update_time_unix: Option<i64>,
    pub distance: Option<f32>,
    pub certainty: Option<f32>,
    pub score: Option<f32>,
    pub explain_score: Option<String>,
}
