//! Error types for the reconciler crate.

use thiserror::Error;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Fetching the service registrations failed.
    #[error("fetching service '{service}' failed")]
    ServiceFetchFailed {
        service: String,
        #[source]
        source: octopus_core::Error,
    },

    /// Listing the workloads failed.
    #[error("listing workloads in namespace '{namespace}' failed")]
    WorkloadFetchFailed {
        namespace: String,
        #[source]
        source: octopus_core::Error,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a service fetch error.
    pub fn service_fetch_failed(service: impl Into<String>, source: octopus_core::Error) -> Self {
        Self::ServiceFetchFailed {
            service: service.into(),
            source,
        }
    }

    /// Create a workload fetch error.
    pub fn workload_fetch_failed(
        namespace: impl Into<String>,
        source: octopus_core::Error,
    ) -> Self {
        Self::WorkloadFetchFailed {
            namespace: namespace.into(),
            source,
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopus_core::Backend;
    use std::error::Error as _;

    #[test]
    fn test_error_display_keeps_cause_as_source() {
        let err = Error::service_fetch_failed(
            "web",
            octopus_core::Error::connection(Backend::Consul, "connection refused"),
        );
        assert_eq!(err.to_string(), "fetching service 'web' failed");
        let cause = err.source().map(ToString::to_string);
        assert_eq!(
            cause.as_deref(),
            Some("consul unreachable: connection refused")
        );
    }
}
