//! Reconciliation of service registrations against running workloads.
//!
//! The reconciler takes two snapshots and classifies every record:
//!
//! - **Registry side**: instances registered for one service
//! - **Workload side**: pods in one namespace, optionally narrowed by a name prefix
//! - **Match policy**: ordered key strategies under which each pod is indexed
//! - **Report**: one row per registration plus one per unmatched pod
//!
//! # Example
//!
//! ```ignore
//! use octopus_core::{InMemoryServiceCatalog, InMemoryWorkloadCatalog};
//! use octopus_reconciler::ReconcilerBuilder;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let reconciler = ReconcilerBuilder::new()
//!         .with_services(Arc::new(InMemoryServiceCatalog::default()))
//!         .with_workloads(Arc::new(InMemoryWorkloadCatalog::default()))
//!         .build()
//!         .unwrap();
//!
//!     let report = reconciler.reconcile("web", "default", "web").await.unwrap();
//!     assert!(report.is_converged());
//! }
//! ```

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod error;
pub mod policy;
pub mod reconciler;
pub mod types;

// Re-export main types
pub use error::{Error, Result};
pub use policy::{KeyStrategy, MatchPolicy};
pub use reconciler::{Reconciler, ReconcilerBuilder, ReconcilerConfig, diff};
pub use types::{MatchStatus, ReconcileReport, ReconciliationRow};
