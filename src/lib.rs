#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # Octopus
//!
//! Cross-checks Consul service registrations against running Kubernetes
//! pods, and deregisters stale instances.
//!
//! The binary is a thin shell over [`cli`], [`commands`] and [`table`]; the
//! backend clients and the reconciler live in the workspace crates.

pub mod cli;
pub mod commands;
pub mod table;

// Re-export workspace crates
pub use octopus_consul;
pub use octopus_core;
pub use octopus_kube;
pub use octopus_reconciler;
