// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # Weaviate Client
//!
//! Typed collections over Weaviate's REST and gRPC APIs. Models, schema
//! derivation and the object codec live in `weaviate-model`; this crate adds
//! the transport, the collection façade and gRPC search.
//!
//! ## Modules
//!
//! - [`client`]: entry point owning the shared connection.
//! - [`config`]: endpoints, timeout and credentials.
//! - [`connection`]: the [`Connection`] seam and its HTTP + gRPC implementation.
//! - [`registry`]: create, bind, check and drop collections.
//! - [`collection`]: object CRUD and reference mutation.
//! - [`tenants`]: tenant management.
//! - [`query`]: gRPC search and result-tree reconstruction.
//! - [`error`]: error types and the crate-level `Result` alias.

pub mod client;
pub mod collection;
pub mod config;
pub mod connection;
pub mod error;
pub mod query;
pub mod registry;
pub mod tenants;

/// Protobuf messages and stub of the Weaviate search service.
#[allow(clippy::all, missing_docs)]
pub mod proto {
    include!("proto/weaviategrpc.rs");
}

pub use client::Client;
pub use collection::{BatchReference, Collection, ConsistencyLevel, ObjectErrors};
pub use config::{Auth, ClientConfig};
pub use connection::{Connection, HttpConnection, RawResponse};
pub use error::{Result, WeaviateError};
pub use query::{
    build_result_tree, Bm25, Hybrid, HybridFusion, LinkTo, MetadataQuery, NearObject, NearVector, Query, QueryObject,
    QueryResult, ReturnProperty, SearchMode,
};
pub use registry::{CollectionConfig, Collections, MultiTenancyConfig, ReplicationConfig};
pub use tenants::{Tenant, Tenants};
