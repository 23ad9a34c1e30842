//! Core types for the reconciler.

use std::fmt;

use itertools::Itertools;
use octopus_core::{ServiceRecord, WorkloadRecord};
use serde::{Deserialize, Serialize};

/// Classification of one reconciliation row.
///
/// Variant order is the row order of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Registered and running.
    Matched,
    /// Registered, but no running workload carries the key.
    RegistryOnly,
    /// Running, but not registered under any of its keys.
    WorkloadOnly,
}

impl MatchStatus {
    /// Whether this row needs attention.
    pub const fn is_drift(self) -> bool {
        !matches!(self, Self::Matched)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Matched => "matched",
            Self::RegistryOnly => "registry-only",
            Self::WorkloadOnly => "workload-only",
        };
        f.write_str(label)
    }
}

/// One row of a reconciliation report.
///
/// Registry fields are empty for [`MatchStatus::WorkloadOnly`]; workload
/// fields are empty for [`MatchStatus::RegistryOnly`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub node: String,
    pub service_id: String,
    pub service_address: String,
    pub workload_id: String,
    pub workload_address: String,
    pub status: MatchStatus,
}

impl ReconciliationRow {
    pub fn matched(service: &ServiceRecord, workload: &WorkloadRecord) -> Self {
        Self {
            node: service.node.clone(),
            service_id: service.service_id.clone(),
            service_address: service.service_address.clone(),
            workload_id: workload.workload_id.clone(),
            workload_address: workload.workload_address.clone(),
            status: MatchStatus::Matched,
        }
    }

    pub fn registry_only(service: &ServiceRecord) -> Self {
        Self {
            node: service.node.clone(),
            service_id: service.service_id.clone(),
            service_address: service.service_address.clone(),
            workload_id: String::new(),
            workload_address: String::new(),
            status: MatchStatus::RegistryOnly,
        }
    }

    pub fn workload_only(workload: &WorkloadRecord) -> Self {
        Self {
            node: workload.node.clone(),
            service_id: String::new(),
            service_address: String::new(),
            workload_id: workload.workload_id.clone(),
            workload_address: workload.workload_address.clone(),
            status: MatchStatus::WorkloadOnly,
        }
    }
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Rows ordered by status, then by key.
    pub rows: Vec<ReconciliationRow>,
    pub matched: usize,
    pub registry_only: usize,
    pub workload_only: usize,
    /// Service records received, before de-duplication.
    pub services_seen: usize,
    /// Workload records received after prefix filtering, before de-duplication.
    pub workloads_seen: usize,
}

impl ReconcileReport {
    /// Build a report, counting rows per status.
    pub fn new(rows: Vec<ReconciliationRow>, services_seen: usize, workloads_seen: usize) -> Self {
        let counts = rows.iter().counts_by(|row| row.status);
        let count = |status: MatchStatus| counts.get(&status).copied().unwrap_or(0);
        Self {
            matched: count(MatchStatus::Matched),
            registry_only: count(MatchStatus::RegistryOnly),
            workload_only: count(MatchStatus::WorkloadOnly),
            rows,
            services_seen,
            workloads_seen,
        }
    }

    /// True when every row is [`MatchStatus::Matched`].
    pub fn is_converged(&self) -> bool {
        !self.rows.iter().any(|row| row.status.is_drift())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
