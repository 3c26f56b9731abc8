// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client entry point.
//!
//! [`Client`] owns the shared [`Connection`] and hands out the collection
//! registry. Cloning is cheap; clones share the connection.

use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::connection::{Connection, HttpConnection};
use crate::error::Result;
use crate::registry::Collections;

/// # Examples
///
/// ```rust,no_run
/// use serde::{Deserialize, Serialize};
/// use weaviate_client::{Client, ClientConfig, CollectionConfig};
/// use weaviate_model::{Model, Object, ObjectModel};
///
/// #[derive(Serialize, Deserialize)]
/// struct Group {
///     name: String,
/// }
///
/// impl ObjectModel for Group {
///     fn model() -> Model {
///         Model::builder("Group").property::<String>("name").build()
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> weaviate_client::Result<()> {
/// let client = Client::connect(ClientConfig::from_env()?).await?;
/// let groups = client
///     .collections()
///     .create::<Group>(CollectionConfig::default().vectorizer("none"))
///     .await?;
/// let id = groups.insert(&Object::new(Group { name: "Name".into() })).await?;
/// assert!(groups.get_by_id(id).await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    connection: Arc<dyn Connection>,
}

impl Client {
    /// Connect over HTTP and gRPC as described by `config`.
    ///
    /// Nothing is sent until the first operation; the gRPC channel connects
    /// lazily.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let connection = HttpConnection::new(&config)?;
        info!(url = %config.url, grpc_url = %config.grpc_url, "Weaviate client configured");
        Ok(Self::with_connection(Arc::new(connection)))
    }

    /// Use a custom transport.
    pub fn with_connection(connection: Arc<dyn Connection>) -> Self {
        Self { connection }
    }

    pub fn collections(&self) -> Collections {
        Collections::new(Arc::clone(&self.connection))
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }
}
