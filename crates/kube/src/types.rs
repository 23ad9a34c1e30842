//! Wire types for the core/v1 pod list API.

use octopus_core::WorkloadRecord;
use serde::Deserialize;

/// `GET /api/v1/namespaces/{ns}/pods` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<Pod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMeta {
    /// Continuation token for the next page; empty on the last page.
    #[serde(default, rename = "continue")]
    pub continue_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: Option<PodSpec>,
    #[serde(default)]
    pub status: Option<PodStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodSpec {
    #[serde(default, rename = "nodeName")]
    pub node_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodStatus {
    #[serde(default, rename = "podIP")]
    pub pod_ip: Option<String>,
}

impl From<Pod> for WorkloadRecord {
    fn from(pod: Pod) -> Self {
        Self {
            namespace: pod.metadata.namespace,
            node: pod.spec.and_then(|s| s.node_name).unwrap_or_default(),
            workload_id: pod.metadata.name,
            workload_address: pod.status.and_then(|s| s.pod_ip).unwrap_or_default(),
        }
    }
}
