//! Read-side seams the reconciler consumes.
//!
//! The Consul and Kubernetes adapters implement these traits; tests use
//! in-memory implementations.

use async_trait::async_trait;

use crate::error::{Backend, Error, Result};
use crate::record::{ServiceRecord, WorkloadRecord};

/// Source of service registrations.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// All distinct registered service names, in backend order.
    async fn fetch_services(&self) -> Result<Vec<String>>;

    /// Every registered instance of `service_name`; empty when none exist.
    async fn fetch_service_detail(&self, service_name: &str) -> Result<Vec<ServiceRecord>>;
}

/// Source of running workloads.
#[async_trait]
pub trait WorkloadCatalog: Send + Sync {
    /// Every workload in `namespace`.
    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadRecord>>;

    /// Workloads in `namespace` whose name starts with `prefix`.
    async fn list_workloads_by_prefix(
        &self,
        namespace: &str,
        prefix: &str,
    ) -> Result<Vec<WorkloadRecord>> {
        let workloads = self.list_workloads(namespace).await?;
        Ok(filter_by_prefix(workloads, prefix))
    }
}

/// Keep workloads whose name starts with `prefix`. An empty prefix keeps all.
pub fn filter_by_prefix(workloads: Vec<WorkloadRecord>, prefix: &str) -> Vec<WorkloadRecord> {
    workloads
        .into_iter()
        .filter(|w| w.has_prefix(prefix))
        .collect()
}

/// Fixed service snapshot, optionally failing every call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceCatalog {
    records: Vec<ServiceRecord>,
    unreachable: bool,
}

impl InMemoryServiceCatalog {
    pub fn new(records: Vec<ServiceRecord>) -> Self {
        Self {
            records,
            unreachable: false,
        }
    }

    /// A catalog whose every call fails with a connection error.
    pub fn unreachable() -> Self {
        Self {
            records: Vec::new(),
            unreachable: true,
        }
    }

    fn check(&self) -> Result<()> {
        if self.unreachable {
            return Err(Error::connection(Backend::Consul, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryServiceCatalog {
    async fn fetch_services(&self) -> Result<Vec<String>> {
        self.check()?;
        let mut names: Vec<String> = Vec::new();
        for record in &self.records {
            if !names.contains(&record.service_name) {
                names.push(record.service_name.clone());
            }
        }
        Ok(names)
    }

    async fn fetch_service_detail(&self, service_name: &str) -> Result<Vec<ServiceRecord>> {
        self.check()?;
        Ok(self
            .records
            .iter()
            .filter(|r| r.service_name == service_name)
            .cloned()
            .collect())
    }
}

/// Fixed workload snapshot, optionally failing every call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkloadCatalog {
    records: Vec<WorkloadRecord>,
    unreachable: bool,
}

impl InMemoryWorkloadCatalog {
    pub fn new(records: Vec<WorkloadRecord>) -> Self {
        Self {
            records,
            unreachable: false,
        }
    }

    /// A catalog whose every call fails with a connection error.
    pub fn unreachable() -> Self {
        Self {
            records: Vec::new(),
            unreachable: true,
        }
    }
}

#[async_trait]
impl WorkloadCatalog for InMemoryWorkloadCatalog {
    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadRecord>> {
        if self.unreachable {
            return Err(Error::connection(Backend::Kubernetes, "connection refused"));
        }
        Ok(self
            .records
            .iter()
            .filter(|w| w.namespace == namespace)
            .cloned()
            .collect())
    }
}
