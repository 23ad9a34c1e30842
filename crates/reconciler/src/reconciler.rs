//! Reconciler implementation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use octopus_core::{IdentityKey, ServiceCatalog, ServiceRecord, WorkloadCatalog, WorkloadRecord};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::policy::MatchPolicy;
use crate::types::{ReconcileReport, ReconciliationRow};

/// Configuration for the reconciler.
#[derive(Debug, Clone, Default)]
pub struct ReconcilerConfig {
    /// Strategies used to index workloads.
    pub policy: MatchPolicy,
}

/// Correlates one service's registrations with the workloads of a namespace.
pub struct Reconciler {
    /// Registry side.
    services: Arc<dyn ServiceCatalog>,
    /// Workload side.
    workloads: Arc<dyn WorkloadCatalog>,
    /// Configuration.
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(
        services: Arc<dyn ServiceCatalog>,
        workloads: Arc<dyn WorkloadCatalog>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            services,
            workloads,
            config,
        }
    }

    /// Fetch both snapshots concurrently and classify every record.
    ///
    /// Workloads are narrowed to names starting with `prefix` before
    /// comparison; an empty prefix keeps all of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceFetchFailed`] or [`Error::WorkloadFetchFailed`]
    /// when either side cannot be read. No partial report is produced.
    pub async fn reconcile(
        &self,
        service_name: &str,
        namespace: &str,
        prefix: &str,
    ) -> Result<ReconcileReport> {
        info!(
            service = service_name,
            namespace, prefix, "Starting reconciliation"
        );

        let fetch_services = async {
            self.services
                .fetch_service_detail(service_name)
                .await
                .map_err(|e| Error::service_fetch_failed(service_name, e))
        };
        let fetch_workloads = async {
            self.workloads
                .list_workloads_by_prefix(namespace, prefix)
                .await
                .map_err(|e| Error::workload_fetch_failed(namespace, e))
        };
        let (services, workloads) = tokio::try_join!(fetch_services, fetch_workloads)?;

        debug!(
            services = services.len(),
            workloads = workloads.len(),
            "Fetched snapshots"
        );

        let rows = diff(&services, &workloads, prefix, &self.config.policy);
        let report = ReconcileReport::new(rows, services.len(), workloads.len());

        if report.is_converged() {
            info!(matched = report.matched, "Service converged");
        } else {
            info!(
                matched = report.matched,
                registry_only = report.registry_only,
                workload_only = report.workload_only,
                "Reconciliation complete"
            );
        }

        Ok(report)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }
}

/// Classify two snapshots without touching any backend.
///
/// Duplicate keys within one side collapse to the last record. Every
/// registration yields one row; every workload none of whose policy keys is
/// registered yields one more. Rows come out ordered by status, then key.
pub fn diff(
    services: &[ServiceRecord],
    workloads: &[WorkloadRecord],
    prefix: &str,
    policy: &MatchPolicy,
) -> Vec<ReconciliationRow> {
    let registry_index: BTreeMap<IdentityKey, &ServiceRecord> = services
        .iter()
        .map(|service| (service.identity_key(), service))
        .collect();

    let distinct_workloads: BTreeMap<IdentityKey, &WorkloadRecord> = workloads
        .iter()
        .map(|workload| (workload.identity_key(), workload))
        .collect();

    // Earlier strategies win when two workloads derive the same key.
    let mut workload_index: HashMap<IdentityKey, (&IdentityKey, &WorkloadRecord)> =
        HashMap::new();
    for strategy in policy.strategies() {
        for (natural, workload) in &distinct_workloads {
            workload_index
                .entry(strategy.key_for(workload, prefix))
                .or_insert((natural, workload));
        }
    }

    let mut claimed: HashSet<&IdentityKey> = HashSet::new();
    let capacity = registry_index.len().saturating_add(distinct_workloads.len());
    let mut rows = Vec::with_capacity(capacity);

    for (key, service) in &registry_index {
        match workload_index.get(key) {
            Some((natural, workload)) => {
                claimed.insert(*natural);
                rows.push(ReconciliationRow::matched(service, workload));
            }
            None => rows.push(ReconciliationRow::registry_only(service)),
        }
    }

    rows.extend(
        distinct_workloads
            .iter()
            .filter(|(natural, _)| !claimed.contains(natural))
            .map(|(_, workload)| ReconciliationRow::workload_only(workload)),
    );

    // Stable, so key order survives within each status.
    rows.sort_by_key(|row| row.status);
    rows
}

/// Builder for Reconciler.
pub struct ReconcilerBuilder {
    services: Option<Arc<dyn ServiceCatalog>>,
    workloads: Option<Arc<dyn WorkloadCatalog>>,
    config: ReconcilerConfig,
}

impl ReconcilerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            services: None,
            workloads: None,
            config: ReconcilerConfig::default(),
        }
    }

    /// Set the service catalog.
    #[must_use]
    pub fn with_services(mut self, services: Arc<dyn ServiceCatalog>) -> Self {
        self.services = Some(services);
        self
    }

    /// Set the workload catalog.
    #[must_use]
    pub fn with_workloads(mut self, workloads: Arc<dyn WorkloadCatalog>) -> Self {
        self.workloads = Some(workloads);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the match policy.
    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Build the reconciler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when a catalog is missing or the
    /// policy has no strategies.
    pub fn build(self) -> Result<Reconciler> {
        let services = self
            .services
            .ok_or_else(|| Error::invalid_config("Service catalog is required"))?;

        let workloads = self
            .workloads
            .ok_or_else(|| Error::invalid_config("Workload catalog is required"))?;

        if self.config.policy.is_empty() {
            return Err(Error::invalid_config(
                "Match policy needs at least one strategy",
            ));
        }

        Ok(Reconciler::new(services, workloads, self.config))
    }
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
