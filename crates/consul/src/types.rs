//! Wire types for the Consul catalog API.

use octopus_core::ServiceRecord;
use serde::{Deserialize, Serialize};

/// One element of `GET /v1/catalog/service/{name}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogServiceEntry {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub datacenter: Option<String>,
    #[serde(rename = "ServiceID", default)]
    pub service_id: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub service_address: String,
    #[serde(default)]
    pub service_port: Option<u16>,
}

impl From<CatalogServiceEntry> for ServiceRecord {
    fn from(entry: CatalogServiceEntry) -> Self {
        Self {
            node: entry.node,
            node_address: entry.address,
            service_id: entry.service_id,
            service_name: entry.service_name,
            service_address: entry.service_address,
            service_port: entry.service_port.map(|p| p.to_string()),
            datacenter: entry.datacenter,
        }
    }
}

/// Body of `PUT /v1/catalog/deregister`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeregisterRequest {
    pub datacenter: String,
    pub node: String,
    #[serde(rename = "ServiceID")]
    pub service_id: String,
}
