//! Kubernetes API client for listing pods.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use octopus_core::{WorkloadCatalog, WorkloadRecord};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Certificate, Identity};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::kubeconfig::ClusterConnection;
use crate::types::PodList;

/// Page size used when listing pods.
const PAGE_LIMIT: &str = "500";

/// Client for the core/v1 pods API of one cluster.
#[derive(Debug, Clone)]
pub struct KubeClient {
    server: Arc<Url>,
    basic_auth: Option<(String, String)>,
    http_client: reqwest::Client,
}

impl KubeClient {
    /// Build a client from a resolved cluster connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKubeconfig`] when certificates or the token
    /// are unusable, and [`Error::ConnectionFailed`] when the HTTP client
    /// cannot be built.
    pub fn from_connection(connection: &ClusterConnection, timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(connection.accept_invalid_certs);

        if let Some(ca_pem) = connection.ca_pem.as_deref() {
            let certificates = Certificate::from_pem_bundle(ca_pem).map_err(|e| {
                Error::invalid_kubeconfig(format!("certificate-authority: {e}"))
            })?;
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        if let Some(identity_pem) = connection.identity_pem.as_deref() {
            let identity = Identity::from_pem(identity_pem)
                .map_err(|e| Error::invalid_kubeconfig(format!("client certificate: {e}")))?;
            builder = builder.identity(identity);
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = connection.token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::invalid_kubeconfig(format!("token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = builder
            .default_headers(headers)
            .build()
            .map_err(|e| Error::connection_failed(e.to_string()))?;

        Ok(Self {
            server: Arc::new(connection.server.clone()),
            basic_auth: connection.basic_auth.clone(),
            http_client,
        })
    }

    /// Load the kubeconfig at `path` (or the default location) and build a client.
    ///
    /// # Errors
    ///
    /// Returns an error when the kubeconfig is missing or unusable.
    pub fn from_kubeconfig(path: Option<&std::path::Path>, timeout: Duration) -> Result<Self> {
        let connection = ClusterConnection::load(path)?;
        Self::from_connection(&connection, timeout)
    }

    /// Every pod in `namespace`, following list continuation tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionFailed`] when the API server is unreachable
    /// and [`Error::Status`] for a non-success answer.
    pub async fn list_pods(&self, namespace: &str) -> Result<Vec<WorkloadRecord>> {
        let url = self.pods_url(namespace)?;
        let mut records = Vec::new();
        let mut continue_token: Option<String> = None;

        loop {
            let mut request = self.http_client.get(url.clone()).query(&[("limit", PAGE_LIMIT)]);
            if let Some(token) = continue_token.as_deref() {
                request = request.query(&[("continue", token)]);
            }
            if let Some((username, password)) = &self.basic_auth {
                request = request.basic_auth(username, Some(password));
            }

            debug!(url = %url, namespace, "Listing pods");
            let response = request.send().await?;

            if !response.status().is_success() {
                let code = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                warn!(code, namespace, "Kubernetes API returned non-success status");
                return Err(Error::status("list pods", code, body));
            }

            let page: PodList = response.json().await?;
            records.extend(page.items.into_iter().map(WorkloadRecord::from));

            match page.metadata.continue_token.filter(|t| !t.is_empty()) {
                Some(next) => continue_token = Some(next),
                None => break,
            }
        }

        debug!(namespace, pods = records.len(), "Listed pods");
        Ok(records)
    }

    fn pods_url(&self, namespace: &str) -> Result<Url> {
        let mut url = (*self.server).clone();
        url.path_segments_mut()
            .map_err(|()| Error::invalid_kubeconfig(format!("'{}' cannot be a base URL", self.server)))?
            .pop_if_empty()
            .extend(["api", "v1", "namespaces", namespace, "pods"]);
        Ok(url)
    }
}

#[async_trait]
impl WorkloadCatalog for KubeClient {
    async fn list_workloads(&self, namespace: &str) -> octopus_core::Result<Vec<WorkloadRecord>> {
        Ok(self.list_pods(namespace).await?)
    }
}
