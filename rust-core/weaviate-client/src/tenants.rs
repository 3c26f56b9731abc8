// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Tenant management of a multi-tenant collection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::connection::Connection;
use crate::error::Result;

/// An isolation partition of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant name, unique within the collection.
    pub name: String,
}

impl Tenant {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Tenants of one collection, via `/v1/schema/{Class}/tenants`.
#[derive(Clone)]
pub struct Tenants {
    connection: Arc<dyn Connection>,
    collection: String,
}

impl Tenants {
    pub(crate) fn new(connection: Arc<dyn Connection>, collection: String) -> Self {
        Self { connection, collection }
    }

    fn path(&self) -> String {
        format!("/v1/schema/{}/tenants", self.collection)
    }

    /// Create the given tenants.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WeaviateError::UnexpectedStatusCode`] if the remote
    /// rejects them, e.g. when multi-tenancy is disabled for the collection.
    #[instrument(skip(self, tenants), fields(collection = %self.collection, count = tenants.len()))]
    pub async fn add(&self, tenants: &[Tenant]) -> Result<()> {
        let body = serde_json::to_value(tenants)?;
        self.connection.post(&self.path(), &body).await?.success("Add tenants")?;
        info!("Tenants added");
        Ok(())
    }

    /// List the tenants of the collection; empty when it has none.
    pub async fn get(&self) -> Result<Vec<Tenant>> {
        let body = self.connection.get(&self.path()).await?.success("Get tenants")?;
        if body.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(body)?)
    }

    /// Delete the named tenants together with their objects.
    #[instrument(skip(self, names), fields(collection = %self.collection, count = names.len()))]
    pub async fn remove<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        let body = serde_json::to_value(names)?;
        self.connection
            .delete(&self.path(), Some(&body))
            .await?
            .success("Remove tenants")?;
        info!("Tenants removed");
        Ok(())
    }
}
