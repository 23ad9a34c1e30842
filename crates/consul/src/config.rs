//! Configuration for the Consul client.

use std::time::Duration;

use octopus_core::ConsulSettings;
use url::Url;

use crate::error::{Error, Result};

/// Configuration for the [`ConsulClient`](crate::ConsulClient).
#[derive(Debug, Clone)]
pub struct ConsulConfig {
    /// Agent base URL, always ending in `/`.
    pub base_url: Url,
    /// ACL token sent as `X-Consul-Token`.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ConsulConfig {
    /// Build a config from a `host:port` pair or a full URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for an empty host and
    /// [`Error::UrlParse`] when the address is not a valid URL.
    pub fn from_host(host: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_host(host)?,
            token: None,
            timeout: default_timeout(),
        })
    }

    /// Build a config from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured host is not a valid address.
    pub fn from_settings(settings: &ConsulSettings) -> Result<Self> {
        Ok(Self {
            base_url: parse_host(&settings.host)?,
            token: settings.token.clone(),
            timeout: settings.timeout(),
        })
    }

    /// Set the ACL token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve an API path below the agent base URL, encoding each segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config_error(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_host(host: &str) -> Result<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(Error::config_error("consul host is empty"));
    }

    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };

    let mut url = Url::parse(&raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

const fn default_timeout() -> Duration {
    Duration::from_secs(10)
}
