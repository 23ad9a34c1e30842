#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # octopus-kube
//!
//! Kubernetes adapter for Octopus: resolves cluster access from a kubeconfig
//! and lists pods as [`WorkloadRecord`](octopus_core::WorkloadRecord)s.
//!
//! ```ignore
//! use octopus_core::WorkloadCatalog;
//! use octopus_kube::KubeClient;
//!
//! let client = KubeClient::from_kubeconfig(None, Duration::from_secs(30))?;
//! let pods = client.list_workloads_by_prefix("default", "withdrawal-service").await?;
//! ```

pub mod client;
pub mod error;
pub mod kubeconfig;
pub mod types;

pub use client::KubeClient;
pub use error::{Error, Result};
pub use kubeconfig::{ClusterConnection, Kubeconfig, default_path};
