#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # octopus-core
//!
//! Shared vocabulary for Octopus: the normalized service and workload
//! records, the identity key used to correlate them, the catalog traits the
//! backend adapters implement, error kinds, and layered settings.

pub mod catalog;
pub mod config;
pub mod error;
pub mod key;
pub mod record;

pub use catalog::{
    InMemoryServiceCatalog, InMemoryWorkloadCatalog, ServiceCatalog, WorkloadCatalog,
    filter_by_prefix,
};
pub use config::{ConsulSettings, KubeSettings, Settings, SettingsOverrides};
pub use error::{Backend, Error, Result};
pub use key::IdentityKey;
pub use record::{ServiceRecord, WorkloadRecord};
