//! Error types for the consul crate.

use octopus_core::Backend;
use thiserror::Error;

/// Result type for consul operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to Consul.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to reach the agent.
    #[error("connection failed: {reason}")]
    ConnectionFailed { reason: String },

    /// The agent answered with an unexpected status.
    #[error("{operation} failed, got status_code={code}")]
    Status {
        operation: String,
        code: u16,
        body: String,
    },

    /// The agent answered with a body we could not decode.
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// Configuration error.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Required input missing.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// URL parse error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
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

    /// Create a config error.
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Status code carried by a [`Error::Status`] error.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
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

impl From<Error> for octopus_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Status { code, body, .. } => Self::status(Backend::Consul, code, body),
            Error::Validation { field, reason } => Self::validation(field, reason),
            Error::ConfigError { reason } => Self::config(reason),
            Error::UrlParse(e) => Self::config(format!("invalid consul address: {e}")),
            other => Self::connection(Backend::Consul, other.to_string()),
        }
    }
}
