// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Transport layer: the [`Connection`] seam and its HTTP + gRPC implementation.
//!
//! Collections, tenants and queries only talk to a `dyn Connection`. Retries,
//! pooling and timeouts are the connection's business; callers see one
//! request and one response.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;
use url::Url;

use crate::config::{Auth, ClientConfig};
use crate::error::{Result, WeaviateError};
use crate::proto::weaviate_client::WeaviateClient;
use crate::proto::{SearchReply, SearchRequest};

/// Status code and JSON body of one REST exchange.
///
/// Bodies that are not JSON are kept as a string, empty bodies as null.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

impl RawResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a 2xx response; any other status becomes
    /// [`WeaviateError::UnexpectedStatusCode`].
    pub fn success(self, context: &str) -> Result<Value> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(self.into_error(context))
        }
    }

    pub fn into_error(self, context: &str) -> WeaviateError {
        let body = match self.body {
            Value::String(text) => text,
            other => other.to_string(),
        };
        WeaviateError::UnexpectedStatusCode {
            context: context.to_string(),
            status: self.status,
            body,
        }
    }
}

/// Raw access to one Weaviate deployment.
///
/// Paths are absolute (`/v1/...`) and may carry a query string. REST methods
/// return whatever status the remote answered with; only transport failures
/// are errors.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn get(&self, path: &str) -> Result<RawResponse>;

    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse>;

    async fn put(&self, path: &str, body: &Value) -> Result<RawResponse>;

    async fn patch(&self, path: &str, body: &Value) -> Result<RawResponse>;

    async fn delete(&self, path: &str, body: Option<&Value>) -> Result<RawResponse>;

    /// Unary `weaviategrpc.Weaviate/Search` call.
    async fn search(&self, request: tonic::Request<SearchRequest>) -> std::result::Result<SearchReply, tonic::Status>;

    /// Token to attach to gRPC calls; empty means unauthenticated.
    fn current_bearer_token(&self) -> String;
}

/// [`Connection`] over `reqwest` for REST and a lazily connected `tonic`
/// channel for gRPC.
pub struct HttpConnection {
    /// Parsed REST base URL (e.g. `http://localhost:8080`).
    base_url: Url,
    /// Connection-pooled HTTP client.
    http: reqwest::Client,
    auth: Auth,
    /// Shared gRPC channel; connects on first use.
    grpc: Channel,
}

impl HttpConnection {
    /// Build a connection from `config`.
    ///
    /// No request is sent here. Must be called inside a tokio runtime, which
    /// drives the gRPC channel.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(WeaviateError::Network)?;

        let grpc = Endpoint::from_shared(config.grpc_url.clone())
            .map_err(|e| WeaviateError::InvalidConfig(format!("invalid gRPC URL `{}`: {e}", config.grpc_url)))?
            .timeout(config.timeout())
            .connect_lazy();

        Ok(Self {
            base_url: config.rest_url()?,
            http,
            auth: config.auth.clone(),
            grpc,
        })
    }

    /// Resolve an API path (`/v1/...`) below the configured base URL.
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| WeaviateError::InvalidConfig(format!("cannot join `{path}` onto {}: {e}", self.base_url)))
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth.bearer_token() {
            "" => builder,
            token => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        }
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        let url = self.url(path)?;
        debug!(%method, %url, "Sending request");

        let mut builder = self.apply_auth(self.http.request(method, url));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(WeaviateError::Network)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(WeaviateError::Network)?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        debug!(status, "Received response");
        Ok(RawResponse::new(status, body))
    }
}

#[async_trait]
impl Connection for HttpConnection {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        self.send(reqwest::Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse> {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<RawResponse> {
        self.send(reqwest::Method::PUT, path, Some(body)).await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<RawResponse> {
        self.send(reqwest::Method::PATCH, path, Some(body)).await
    }

    async fn delete(&self, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.send(reqwest::Method::DELETE, path, body).await
    }

    async fn search(&self, request: tonic::Request<SearchRequest>) -> std::result::Result<SearchReply, tonic::Status> {
        let mut client = WeaviateClient::new(self.grpc.clone());
        client.search(request).await.map(tonic::Response::into_inner)
    }

    fn current_bearer_token(&self) -> String {
        self.auth.bearer_token().to_string()
    }
}
