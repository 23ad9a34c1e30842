//! Normalized records produced by the catalog adapters.

use serde::{Deserialize, Serialize};

use crate::key::IdentityKey;

/// One registered instance of a service in the discovery backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Node the instance is registered on.
    pub node: String,
    /// Address of that node.
    pub node_address: String,
    /// Registered service ID.
    pub service_id: String,
    /// Logical service name, when the backend reports it.
    #[serde(default)]
    pub service_name: String,
    /// Address the service advertises.
    pub service_address: String,
    /// Advertised port, rendered as a decimal string.
    #[serde(default)]
    pub service_port: Option<String>,
    /// Datacenter the entry belongs to, when reported.
    #[serde(default)]
    pub datacenter: Option<String>,
}

impl ServiceRecord {
    /// Create a record from the three identifying fields.
    pub fn new(
        node: impl Into<String>,
        service_id: impl Into<String>,
        service_address: impl Into<String>,
    ) -> Self {
        Self {
            node: node.into(),
            node_address: String::new(),
            service_id: service_id.into(),
            service_name: String::new(),
            service_address: service_address.into(),
            service_port: None,
            datacenter: None,
        }
    }

    /// Set the node address.
    #[must_use]
    pub fn with_node_address(mut self, address: impl Into<String>) -> Self {
        self.node_address = address.into();
        self
    }

    /// Set the service port.
    #[must_use]
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.service_port = Some(port.into());
        self
    }

    /// Set the logical service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Identity key of this registration.
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::new(&self.node, &self.service_id, &self.service_address)
    }
}

/// One running workload (pod) in the orchestration backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRecord {
    pub namespace: String,
    /// Node the pod is scheduled on; empty until scheduled.
    pub node: String,
    /// Pod name.
    pub workload_id: String,
    /// Pod IP; empty until assigned.
    pub workload_address: String,
}

impl WorkloadRecord {
    pub fn new(
        namespace: impl Into<String>,
        node: impl Into<String>,
        workload_id: impl Into<String>,
        workload_address: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            node: node.into(),
            workload_id: workload_id.into(),
            workload_address: workload_address.into(),
        }
    }

    /// Natural identity key: (node, pod name, pod IP).
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::new(&self.node, &self.workload_id, &self.workload_address)
    }

    /// Anchored, case-sensitive prefix match on the pod name.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.workload_id.starts_with(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_record_key() {
        let record = ServiceRecord::new("node1", "svcA", "10.0.0.1").with_port("8080");
        assert_eq!(
            record.identity_key(),
            IdentityKey::new("node1", "svcA", "10.0.0.1")
        );
        assert_eq!(record.service_port.as_deref(), Some("8080"));
    }

    #[test]
    fn test_workload_prefix_is_anchored() {
        let pod = WorkloadRecord::new("default", "node1", "api-foo-123", "10.0.0.2");
        assert!(pod.has_prefix("api"));
        assert!(pod.has_prefix(""));
        assert!(!pod.has_prefix("foo"));
        assert!(!pod.has_prefix("API"));
    }
}
