// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client configuration and credentials.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, WeaviateError};

pub const DEFAULT_URL: &str = "http://localhost:8080";
pub const DEFAULT_GRPC_URL: &str = "http://localhost:50051";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Authentication method for connecting to a Weaviate instance.
///
/// Weaviate takes API keys and OIDC access tokens the same way, as
/// `Authorization: Bearer <token>` on REST and `authorization` metadata on
/// gRPC; the variants only differ in where the secret came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Auth {
    /// No authentication (local development, trusted networks).
    #[default]
    None,
    /// Static API key issued by the instance.
    ApiKey(String),
    /// Access token obtained out of band.
    Bearer(String),
}

impl Auth {
    /// Token sent with every request; empty when unauthenticated.
    pub fn bearer_token(&self) -> &str {
        match self {
            Auth::None => "",
            Auth::ApiKey(token) | Auth::Bearer(token) => token,
        }
    }
}

/// Connection parameters of one Weaviate deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// REST base URL. It may carry a path prefix (for a deployment behind a
    /// reverse proxy); API paths are resolved below it.
    pub url: String,
    /// gRPC endpoint.
    pub grpc_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub auth: Auth,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            grpc_url: DEFAULT_GRPC_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth: Auth::None,
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Configuration from `WEAVIATE_URL`, `WEAVIATE_GRPC_URL`,
    /// `WEAVIATE_API_KEY` and `WEAVIATE_TIMEOUT_SECS`; unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("WEAVIATE_URL") {
            config.url = url;
        }
        if let Some(grpc_url) = lookup("WEAVIATE_GRPC_URL") {
            config.grpc_url = grpc_url;
        }
        if let Some(key) = lookup("WEAVIATE_API_KEY").filter(|key| !key.is_empty()) {
            config.auth = Auth::ApiKey(key);
        }
        if let Some(secs) = lookup("WEAVIATE_TIMEOUT_SECS") {
            config.timeout_secs = secs.parse().map_err(|e| {
                WeaviateError::InvalidConfig(format!("WEAVIATE_TIMEOUT_SECS={secs}: {e}"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_grpc_url(mut self, grpc_url: impl Into<String>) -> Self {
        self.grpc_url = grpc_url.into();
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that both endpoints parse and the timeout is usable.
    pub fn validate(&self) -> Result<()> {
        self.rest_url()?;
        Url::parse(&self.grpc_url)
            .map_err(|e| WeaviateError::InvalidConfig(format!("invalid gRPC URL `{}`: {e}", self.grpc_url)))?;
        if self.timeout_secs == 0 {
            return Err(WeaviateError::InvalidConfig("timeout must be positive".into()));
        }
        Ok(())
    }

    /// REST base URL with a trailing slash, so joined paths keep its prefix.
    pub(crate) fn rest_url(&self) -> Result<Url> {
        let mut url =
            Url::parse(&self.url).map_err(|e| WeaviateError::InvalidConfig(format!("invalid URL `{}`: {e}", self.url)))?;
        if !url.path().ends_with('/') {
            let prefixed = format!("{}/", url.path());
            url.set_path(&prefixed);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.url, "http://localhost:8080");
        assert_eq!(config.grpc_url, "http://localhost:50051");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.auth.bearer_token(), "");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("WEAVIATE_URL", "https://db.example.com"),
            ("WEAVIATE_API_KEY", "secret"),
            ("WEAVIATE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.url, "https://db.example.com");
        assert_eq!(config.grpc_url, DEFAULT_GRPC_URL);
        assert_eq!(config.auth, Auth::ApiKey("secret".into()));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_bad_environment_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("WEAVIATE_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, WeaviateError::InvalidConfig(_)));

        let err = ClientConfig::from_lookup(lookup(&[("WEAVIATE_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, WeaviateError::InvalidConfig(_)));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: ClientConfig = serde_json::from_str(r#"{"url": "http://db:8080", "auth": {"bearer": "t"}}"#).unwrap();
        assert_eq!(config.url, "http://db:8080");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.auth.bearer_token(), "t");
    }
}
