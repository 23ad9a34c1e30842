//! Kubeconfig loading and resolution.
//!
//! Only the subset needed to list pods is understood: the current (or a
//! named) context, its cluster's server and CA, and static user credentials
//! (bearer token, token file, client certificate, basic auth). Exec and
//! auth-provider plugins are rejected with a clear error.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use directories::BaseDirs;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Parsed kubeconfig document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Kubeconfig {
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
    #[serde(default)]
    pub current_context: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub certificate_authority: Option<PathBuf>,
    #[serde(default)]
    pub certificate_authority_data: Option<String>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Context {
    pub cluster: String,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct User {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "tokenFile")]
    pub token_file: Option<PathBuf>,
    #[serde(default)]
    pub client_certificate: Option<PathBuf>,
    #[serde(default)]
    pub client_certificate_data: Option<String>,
    #[serde(default)]
    pub client_key: Option<PathBuf>,
    #[serde(default)]
    pub client_key_data: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub exec: Option<serde_yaml::Value>,
    #[serde(default)]
    pub auth_provider: Option<serde_yaml::Value>,
}

/// Everything needed to open an authenticated connection to one cluster.
#[derive(Debug, Clone)]
pub struct ClusterConnection {
    pub server: Url,
    /// PEM bundle of trusted CA certificates.
    pub ca_pem: Option<Vec<u8>>,
    pub accept_invalid_certs: bool,
    pub token: Option<String>,
    pub basic_auth: Option<(String, String)>,
    /// Client certificate followed by its private key, PEM encoded.
    pub identity_pem: Option<Vec<u8>>,
}

impl ClusterConnection {
    /// Connection to `server` with no credentials.
    pub fn anonymous(server: Url) -> Self {
        Self {
            server,
            ca_pem: None,
            accept_invalid_certs: false,
            token: None,
            basic_auth: None,
            identity_pem: None,
        }
    }

    /// Resolve the current context of the kubeconfig at `path`, or of the
    /// default location when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error when no kubeconfig exists or it cannot be resolved.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_path().ok_or(Error::KubeconfigNotFound)?,
        };
        debug!(path = %path.display(), "Loading kubeconfig");

        let config = Kubeconfig::read(&path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.connection(None, base_dir)
    }
}

/// `$HOME/.kube/config`, when a home directory is known.
pub fn default_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".kube").join("config"))
}

impl Kubeconfig {
    /// Parse kubeconfig YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKubeconfig`] when the YAML does not parse.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::invalid_kubeconfig(e.to_string()))
    }

    /// Read and parse a kubeconfig file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing, unreadable, or invalid.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::kubeconfig_read(path, e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Resolve `context` (or `current-context`) into a connection.
    ///
    /// Relative file references are resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKubeconfig`] when the context, its cluster or
    /// its user is missing, or credentials cannot be read.
    pub fn connection(&self, context: Option<&str>, base_dir: &Path) -> Result<ClusterConnection> {
        let context_name = context
            .map(str::to_string)
            .or_else(|| self.current_context.clone())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::invalid_kubeconfig("current-context is not set"))?;

        let context = self
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .map(|c| &c.context)
            .ok_or_else(|| Error::invalid_kubeconfig(format!("context '{context_name}' not found")))?;

        let cluster = self
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| {
                Error::invalid_kubeconfig(format!("cluster '{}' not found", context.cluster))
            })?;

        let server = Url::parse(cluster.server.trim()).map_err(|e| {
            Error::invalid_kubeconfig(format!("cluster '{}' server: {e}", context.cluster))
        })?;

        let user = match context.user.as_str() {
            "" => User::default(),
            name => self
                .users
                .iter()
                .find(|u| u.name == name)
                .map(|u| u.user.clone())
                .ok_or_else(|| Error::invalid_kubeconfig(format!("user '{name}' not found")))?,
        };

        if user.exec.is_some() || user.auth_provider.is_some() {
            return Err(Error::invalid_kubeconfig(format!(
                "user '{}' uses an exec/auth-provider plugin, which is not supported",
                context.user
            )));
        }

        let ca_pem = read_inline_or_file(
            cluster.certificate_authority_data.as_deref(),
            cluster.certificate_authority.as_deref(),
            base_dir,
            "certificate-authority",
        )?;

        let token = match (&user.token, &user.token_file) {
            (Some(token), _) => Some(token.trim().to_string()),
            (None, Some(file)) => {
                let path = base_dir.join(file);
                let token = std::fs::read_to_string(&path)
                    .map_err(|e| Error::kubeconfig_read(&path, e.to_string()))?;
                Some(token.trim().to_string())
            }
            (None, None) => None,
        };

        let certificate = read_inline_or_file(
            user.client_certificate_data.as_deref(),
            user.client_certificate.as_deref(),
            base_dir,
            "client-certificate",
        )?;
        let key = read_inline_or_file(
            user.client_key_data.as_deref(),
            user.client_key.as_deref(),
            base_dir,
            "client-key",
        )?;
        let identity_pem = match (certificate, key) {
            (Some(mut cert), Some(key)) => {
                if !cert.ends_with(b"\n") {
                    cert.push(b'\n');
                }
                cert.extend_from_slice(&key);
                Some(cert)
            }
            (None, None) => None,
            _ => {
                return Err(Error::invalid_kubeconfig(
                    "client-certificate and client-key must be provided together",
                ));
            }
        };

        let basic_auth = user.username.clone().zip(user.password.clone());

        Ok(ClusterConnection {
            server,
            ca_pem,
            accept_invalid_certs: cluster.insecure_skip_tls_verify,
            token,
            basic_auth,
            identity_pem,
        })
    }
}

fn read_inline_or_file(
    data: Option<&str>,
    file: Option<&Path>,
    base_dir: &Path,
    field: &str,
) -> Result<Option<Vec<u8>>> {
    if let Some(data) = data {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| Error::invalid_kubeconfig(format!("{field}-data is not base64: {e}")))?;
        return Ok(Some(bytes));
    }
    match file {
        Some(file) => {
            let path = base_dir.join(file);
            std::fs::read(&path)
                .map(Some)
                .map_err(|e| Error::kubeconfig_read(&path, e.to_string()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use super::*;

    const KUBECONFIG: &str = r"
apiVersion: v1
kind: Config
current-context: staging
clusters:
  - name: staging-cluster
    cluster:
      server: https://10.0.0.1:6443
      certificate-authority-data: LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0tCg==
  - name: local
    cluster:
      server: http://127.0.0.1:8001
      insecure-skip-tls-verify: true
contexts:
  - name: staging
    context:
      cluster: staging-cluster
      user: deployer
      namespace: payments
  - name: proxy
    context:
      cluster: local
users:
  - name: deployer
    user:
      token: abc123
";

    #[test]
    fn test_current_context_resolves() {
        let config = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
        let conn = config.connection(None, Path::new("/")).unwrap();

        assert_eq!(conn.server.as_str(), "https://10.0.0.1:6443/");
        assert_eq!(conn.token.as_deref(), Some("abc123"));
        assert_eq!(
            conn.ca_pem.as_deref(),
            Some(b"-----BEGIN CERTIFICATE-----\n".as_slice())
        );
        assert!(!conn.accept_invalid_certs);
    }

    #[test]
    fn test_named_context_without_user() {
        let config = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
        let conn = config.connection(Some("proxy"), Path::new("/")).unwrap();

        assert!(conn.token.is_none());
        assert!(conn.accept_invalid_certs);
    }

    #[test]
    fn test_missing_context_is_error() {
        let config = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
        let result = config.connection(Some("prod"), Path::new("/"));
        assert!(matches!(result, Err(Error::InvalidKubeconfig { .. })));
    }

    #[test]
    fn test_no_current_context_is_error() {
        let config = Kubeconfig::from_yaml("apiVersion: v1\nkind: Config\n").unwrap();
        let result = config.connection(None, Path::new("/"));
        assert!(matches!(result, Err(Error::InvalidKubeconfig { .. })));
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let result = Kubeconfig::from_yaml("clusters: [\n");
        assert!(matches!(result, Err(Error::InvalidKubeconfig { .. })));
    }

    #[test]
    fn test_exec_plugin_is_rejected() {
        let yaml = r"
current-context: eks
clusters:
  - name: eks
    cluster:
      server: https://eks.example.com
contexts:
  - name: eks
    context:
      cluster: eks
      user: aws
users:
  - name: aws
    user:
      exec:
        command: aws
";
        let config = Kubeconfig::from_yaml(yaml).unwrap();
        let result = config.connection(None, Path::new("/"));
        assert!(matches!(result, Err(Error::InvalidKubeconfig { .. })));
    }

    #[test]
    fn test_relative_files_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut token = std::fs::File::create(dir.path().join("token")).unwrap();
        writeln!(token, "from-file").unwrap();

        let yaml = r"
current-context: dev
clusters:
  - name: dev
    cluster:
      server: https://dev.example.com
contexts:
  - name: dev
    context:
      cluster: dev
      user: dev
users:
  - name: dev
    user:
      tokenFile: token
";
        let config_path = dir.path().join("config");
        std::fs::write(&config_path, yaml).unwrap();

        let conn = ClusterConnection::load(Some(&config_path)).unwrap();
        assert_eq!(conn.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = ClusterConnection::load(Some(Path::new("/nonexistent/kubeconfig")));
        assert!(matches!(result, Err(Error::KubeconfigRead { .. })));
    }

    #[test]
    fn test_certificate_without_key_is_error() {
        let yaml = r"
current-context: dev
clusters:
  - name: dev
    cluster:
      server: https://dev.example.com
contexts:
  - name: dev
    context:
      cluster: dev
      user: dev
users:
  - name: dev
    user:
      client-certificate-data: Y2VydA==
";
        let config = Kubeconfig::from_yaml(yaml).unwrap();
        let result = config.connection(None, Path::new("/"));
        assert!(matches!(result, Err(Error::InvalidKubeconfig { .. })));
    }
}
