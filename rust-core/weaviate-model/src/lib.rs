// SPDX-License-Identifier: PMPL-1.0-or-later
//! Weaviate Model
//!
//! Maps statically declared object models onto a Weaviate collection schema
//! and converts objects between their Rust form and the wire form: plain
//! properties as JSON values, references as beacon lists.
//!
//! Nothing in this crate performs I/O; the REST and gRPC layers live in
//! `weaviate-client`.

pub mod codec;
pub mod dynamic;
pub mod error;
pub mod identifier;
pub mod model;
pub mod object;
pub mod property;
pub mod reference;
pub mod types;

pub use codec::{decode, decode_properties, encode, validate, EncodeMode, RestObject, WireObject};
pub use dynamic::{DynamicProperties, FieldValue};
pub use error::{ModelError, Result};
pub use identifier::normalize_uuid;
pub use model::{schemas_compatible, Model, ModelBuilder, ObjectModel, Properties};
pub use object::{Metadata, Object};
pub use property::{PropertyConfig, PropertyDescriptor, PropertyKind, ReferenceTarget, SchemaProperty, Tokenization};
pub use reference::{collection_name, from_beacons, to_beacons, Beacon};
pub use types::{to_host_type, to_remote_type, DataType, FieldType, HostType, ReferenceField, ScalarType};
