// SPDX-License-Identifier: PMPL-1.0-or-later
//! Model error types.
//!
//! Everything in this crate is local and deterministic, so every variant here
//! is raised before any network I/O happens.

use thiserror::Error;

/// Errors raised while mapping, validating or (de)serializing objects.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No mapping exists between a host type and a remote data type.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// An object does not conform to its declared model.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ModelError::Validation(message.into())
    }
}

/// Crate-level result alias using [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;
