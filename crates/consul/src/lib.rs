#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # octopus-consul
//!
//! Consul adapter for Octopus.
//!
//! ## Features
//!
//! - List every registered service name
//! - Fetch and normalize all instances of one service into [`ServiceRecord`]s
//! - Deregister a single service instance from the catalog
//!
//! ## Example
//!
//! ```ignore
//! use octopus_consul::ConsulClient;
//!
//! let client = ConsulClient::new("localhost:8500")?;
//! let names = client.services().await?;
//! let instances = client.service_detail("web").await?;
//! client.deregister("dc1", "node-1", "web-abc").await?;
//! ```
//!
//! [`ServiceRecord`]: octopus_core::ServiceRecord

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::ConsulClient;
pub use config::ConsulConfig;
pub use error::{Error, Result};
pub use types::{CatalogServiceEntry, DeregisterRequest};
