//! Error types for the kube crate.

use std::path::PathBuf;

use octopus_core::Backend;
use thiserror::Error;

/// Result type for kube operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving cluster access or listing pods.
#[derive(Error, Debug)]
pub enum Error {
    /// No kubeconfig path could be determined.
    #[error("no kubeconfig found: pass --kubeconfig, set KUBECONFIG, or create ~/.kube/config")]
    KubeconfigNotFound,

    /// Kubeconfig file could not be read.
    #[error("failed to read kubeconfig '{path}': {reason}")]
    KubeconfigRead { path: PathBuf, reason: String },

    /// Kubeconfig content is invalid or incomplete.
    #[error("invalid kubeconfig: {reason}")]
    InvalidKubeconfig { reason: String },

    /// Failed to reach the API server.
    #[error("connection failed: {reason}")]
    ConnectionFailed { reason: String },

    /// API server answered with an unexpected status.
    #[error("{operation} failed, got status_code={code}")]
    Status {
        operation: String,
        code: u16,
        body: String,
    },

    /// API server answered with a body we could not decode.
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// URL parse error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Create a kubeconfig read error.
    pub fn kubeconfig_read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::KubeconfigRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid kubeconfig error.
    pub fn invalid_kubeconfig(reason: impl Into<String>) -> Self {
        Self::InvalidKubeconfig {
            reason: reason.into(),
        }
    }

    /// Create a connection failed error.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            reason: reason.into(),
        }
    }

    /// Create a status error.
    pub fn status(operation: impl Into<String>, code: u16, body: impl Into<String>) -> Self {
        Self::Status {
            operation: operation.into(),
            code,
            body: body.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::invalid_response(err.to_string())
        } else {
            Self::connection_failed(err.to_string())
        }
    }
}

// Kubeconfig problems surface as connection errors.
impl From<Error> for octopus_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Status { code, body, .. } => Self::status(Backend::Kubernetes, code, body),
            other => Self::connection(Backend::Kubernetes, other.to_string()),
        }
    }
}
