//! Core error kinds shared by every Octopus backend adapter.
//!
//! Adapter crates keep their own detailed errors and convert into these kinds
//! at the catalog boundary, so the command layer only has to tell apart an
//! unreachable backend, a rejected request, bad input, and bad configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Backend a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Consul,
    Kubernetes,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consul => write!(f, "consul"),
            Self::Kubernetes => write!(f, "kubernetes"),
        }
    }
}

/// Core error type for Octopus operations.
#[derive(Debug, Error)]
pub enum Error {
    // Backend errors
    #[error("{backend} unreachable: {reason}")]
    Connection { backend: Backend, reason: String },

    #[error("{backend} returned status_code={code}: {body}")]
    Status {
        backend: Backend,
        code: u16,
        body: String,
    },

    // Input errors
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // Configuration errors
    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error("failed to read file '{path}': {reason}")]
    FileReadFailed { path: PathBuf, reason: String },
}

impl Error {
    /// Create a connection error.
    pub fn connection(backend: Backend, reason: impl Into<String>) -> Self {
        Self::Connection {
            backend,
            reason: reason.into(),
        }
    }

    /// Create a status error from a non-success response.
    pub fn status(backend: Backend, code: u16, body: impl Into<String>) -> Self {
        Self::Status {
            backend,
            code,
            body: body.into(),
        }
    }

    /// Create a validation error for a named input.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a file read error.
    pub fn file_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised before any backend was contacted.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
