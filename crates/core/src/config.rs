//! Layered settings for Octopus commands.
//!
//! Resolution order, lowest to highest precedence:
//!
//! 1. Built-in defaults
//! 2. Settings file (`--config`, else `<config dir>/octopus/config.toml` when present)
//! 3. Environment variables
//! 4. Command-line flags ([`SettingsOverrides`])
//!
//! The resolved [`Settings`] value is handed to each command handler; nothing
//! is read from global state after startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const ENV_CONSUL_ADDR: &str = "CONSUL_HTTP_ADDR";
pub const ENV_CONSUL_TOKEN: &str = "CONSUL_HTTP_TOKEN";
pub const ENV_DATACENTER: &str = "OCTOPUS_DATACENTER";
pub const ENV_KUBECONFIG: &str = "KUBECONFIG";
pub const ENV_NAMESPACE: &str = "OCTOPUS_NAMESPACE";

/// Fully resolved settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub consul: ConsulSettings,
    pub kubernetes: KubeSettings,
}

/// Discovery backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsulSettings {
    /// `host:port` or a full URL.
    pub host: String,
    pub datacenter: String,
    /// ACL token sent as `X-Consul-Token`.
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ConsulSettings {
    fn default() -> Self {
        Self {
            host: "localhost:8500".to_string(),
            datacenter: "dc1".to_string(),
            token: None,
            timeout_secs: 10,
        }
    }
}

impl ConsulSettings {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Orchestration backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeSettings {
    /// Explicit kubeconfig path; `None` falls back to `$HOME/.kube/config`.
    pub kubeconfig: Option<PathBuf>,
    pub namespace: String,
    pub timeout_secs: u64,
}

impl Default for KubeSettings {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            namespace: "default".to_string(),
            timeout_secs: 30,
        }
    }
}

impl KubeSettings {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Values supplied on the command line. `None` leaves the lower layer intact.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub consul_host: Option<String>,
    pub consul_token: Option<String>,
    pub datacenter: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub namespace: Option<String>,
}

impl Settings {
    /// Parse settings from TOML text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the text is not valid settings TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("invalid settings: {e}")))
    }

    /// Read settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_read_failed(path, e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Default settings file location for the current user.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "octopus").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Resolve defaults, file and process environment.
    ///
    /// An explicit path must exist; the default path is only read when present.
    ///
    /// # Errors
    ///
    /// Returns an error when the chosen settings file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_file = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    debug!(path = %path.display(), "Loading settings file");
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };
        Ok(from_file.apply_env(|key| std::env::var(key).ok()))
    }

    /// Layer environment values on top, reading them through `lookup`.
    #[must_use]
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(ENV_CONSUL_ADDR) {
            self.consul.host = host;
        }
        if let Some(token) = get(ENV_CONSUL_TOKEN) {
            self.consul.token = Some(token);
        }
        if let Some(dc) = get(ENV_DATACENTER) {
            self.consul.datacenter = dc;
        }
        // KUBECONFIG may list several files; the first non-empty one wins.
        if let Some(path) = get(ENV_KUBECONFIG)
            .and_then(|v| std::env::split_paths(&v).find(|p| !p.as_os_str().is_empty()))
        {
            self.kubernetes.kubeconfig = Some(path);
        }
        if let Some(ns) = get(ENV_NAMESPACE) {
            self.kubernetes.namespace = ns;
        }
        self
    }

    /// Layer command-line values on top.
    #[must_use]
    pub fn apply_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(host) = overrides.consul_host {
            self.consul.host = host;
        }
        if let Some(token) = overrides.consul_token {
            self.consul.token = Some(token);
        }
        if let Some(dc) = overrides.datacenter {
            self.consul.datacenter = dc;
        }
        if let Some(path) = overrides.kubeconfig {
            self.kubernetes.kubeconfig = Some(path);
        }
        if let Some(ns) = overrides.namespace {
            self.kubernetes.namespace = ns;
        }
        self
    }
}
