//! Consul catalog client.
//!
//! Reads go to `/v1/catalog/services` and `/v1/catalog/service/{name}`;
//! the single write goes to `/v1/catalog/deregister`. Nothing is retried.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use octopus_core::{ServiceCatalog, ServiceRecord};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use tracing::{debug, info, warn};

use crate::config::ConsulConfig;
use crate::error::{Error, Result};
use crate::types::{CatalogServiceEntry, DeregisterRequest};

const TOKEN_HEADER: &str = "X-Consul-Token";

/// Client for the Consul HTTP API.
#[derive(Debug, Clone)]
pub struct ConsulClient {
    config: Arc<ConsulConfig>,
    http_client: reqwest::Client,
}

impl ConsulClient {
    /// Create a client for `host` (`host:port` or URL) with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the host is invalid or the HTTP client cannot be built.
    pub fn new(host: &str) -> Result<Self> {
        Self::with_config(ConsulConfig::from_host(host)?)
    }

    /// Create a client with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the token is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn with_config(config: ConsulConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = config.token.as_deref() {
            let mut value = HeaderValue::from_str(token)
                .map_err(|e| Error::config_error(format!("invalid consul token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(TOKEN_HEADER, value);
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::connection_failed(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    /// All registered service names, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionFailed`] when the agent is unreachable and
    /// [`Error::Status`] for a non-success answer.
    pub async fn services(&self) -> Result<Vec<String>> {
        let url = self.config.endpoint(&["v1", "catalog", "services"])?;
        debug!(url = %url, "Fetching consul services");

        let response = self.http_client.get(url).send().await?;
        let response = ensure_success(response, "get services").await?;

        let services: BTreeMap<String, serde_json::Value> = response.json().await?;
        Ok(services.into_keys().collect())
    }

    /// Every registered instance of `service_name`.
    ///
    /// Consul answers `[]` for an unknown service, so that case is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionFailed`] when the agent is unreachable and
    /// [`Error::Status`] for a non-success answer.
    pub async fn service_detail(&self, service_name: &str) -> Result<Vec<ServiceRecord>> {
        let url = self
            .config
            .endpoint(&["v1", "catalog", "service", service_name])?;
        debug!(url = %url, service = service_name, "Fetching consul service detail");

        let response = self.http_client.get(url).send().await?;
        let response = ensure_success(response, "get service detail").await?;

        let entries: Vec<CatalogServiceEntry> = response.json().await?;
        debug!(service = service_name, instances = entries.len(), "Fetched service detail");
        Ok(entries.into_iter().map(ServiceRecord::from).collect())
    }

    /// Remove `service_id` registered on `node` in `datacenter`.
    ///
    /// Issues exactly one `PUT /v1/catalog/deregister`; anything other than
    /// HTTP 200 is returned as [`Error::Status`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] before any request when `node` or
    /// `service_id` is empty.
    pub async fn deregister(&self, datacenter: &str, node: &str, service_id: &str) -> Result<()> {
        if node.trim().is_empty() {
            return Err(Error::validation("node", "please specify node"));
        }
        if service_id.trim().is_empty() {
            return Err(Error::validation("service", "please specify service name"));
        }

        let url = self.config.endpoint(&["v1", "catalog", "deregister"])?;
        let body = DeregisterRequest {
            datacenter: datacenter.to_string(),
            node: node.to_string(),
            service_id: service_id.to_string(),
        };

        info!(datacenter, node, service = service_id, "Deregistering service");
        let response = self.http_client.put(url).json(&body).send().await?;

        if response.status() != StatusCode::OK {
            let code = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            warn!(code, "Consul rejected deregistration");
            return Err(Error::status("deregister service", code, text));
        }

        Ok(())
    }
}

async fn ensure_success(response: Response, operation: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let code = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!(code, operation, "Consul returned non-success status");
    Err(Error::status(operation, code, body))
}

#[async_trait]
impl ServiceCatalog for ConsulClient {
    async fn fetch_services(&self) -> octopus_core::Result<Vec<String>> {
        Ok(self.services().await?)
    }

    async fn fetch_service_detail(
        &self,
        service_name: &str,
    ) -> octopus_core::Result<Vec<ServiceRecord>> {
        Ok(self.service_detail(service_name).await?)
    }
}
