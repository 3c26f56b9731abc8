// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the Weaviate client.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, WeaviateError>`. Local failures (type mapping,
//! validation) are raised before any request is sent; remote failures carry
//! the remote's diagnostic payload unmodified.

use thiserror::Error;
use weaviate_model::ModelError;

/// Error type for Weaviate client operations.
#[derive(Error, Debug)]
pub enum WeaviateError {
    /// A field type has no remote data type (or the reverse).
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// An object failed structural or type checks before the request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A local model does not match the remote collection it was bound to.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The remote answered with a status the operation does not accept.
    #[error("{context} failed with status {status}: {body}")]
    UnexpectedStatusCode {
        /// Operation that issued the request (e.g. "Get schema").
        context: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The gRPC search call failed; no results are returned.
    #[error("Search execution failed: {0}")]
    SearchExecution(String),

    /// An underlying HTTP transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client configuration could not be used (bad URL, bad timeout, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ModelError> for WeaviateError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnsupportedType(message) => WeaviateError::UnsupportedType(message),
            ModelError::Validation(message) => WeaviateError::Validation(message),
            ModelError::Serialization(err) => WeaviateError::Serialization(err),
        }
    }
}

/// Crate-level result alias using [`WeaviateError`].
pub type Result<T> = std::result::Result<T, WeaviateError>;
