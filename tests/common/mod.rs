// Common test infrastructure for octopus CLI tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Environment variables that would leak the developer's setup into a test.
const ISOLATED_ENV: &[&str] = &[
    "CONSUL_HTTP_ADDR",
    "CONSUL_HTTP_TOKEN",
    "OCTOPUS_DATACENTER",
    "OCTOPUS_NAMESPACE",
    "KUBECONFIG",
    "RUST_LOG",
];

/// A scratch home directory so no user settings or kubeconfig are picked up.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Result<Self, std::io::Error> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// The octopus binary, isolated from the caller's environment.
    pub fn octopus(&self) -> Result<Command, Box<dyn std::error::Error>> {
        let mut cmd = Command::cargo_bin("octopus")?;
        for key in ISOLATED_ENV {
            cmd.env_remove(key);
        }
        cmd.env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env("NO_COLOR", "1");
        Ok(cmd)
    }

    /// Write a kubeconfig with a bearer token pointing at `server`.
    pub fn write_kubeconfig(&self, server: &str) -> Result<PathBuf, std::io::Error> {
        let path = self.dir.path().join("kubeconfig");
        let content = format!(
            "apiVersion: v1
kind: Config
current-context: test
clusters:
- name: test
  cluster:
    server: {server}
contexts:
- name: test
  context:
    cluster: test
    user: tester
users:
- name: tester
  user:
    token: test-token
"
        );
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Write a settings file.
    pub fn write_settings(&self, content: &str) -> Result<PathBuf, std::io::Error> {
        let path = self.dir.path().join("octopus.toml");
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Run a prepared command off the async runtime so mock servers keep serving.
pub async fn run(mut cmd: Command) -> Result<Output, Box<dyn std::error::Error>> {
    let output = tokio::task::spawn_blocking(move || cmd.output()).await??;
    Ok(output)
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn pod(name: &str, namespace: &str, node: &str, ip: &str) -> serde_json::Value {
    serde_json::json!({
        "metadata": {"name": name, "namespace": namespace},
        "spec": {"nodeName": node},
        "status": {"podIP": ip}
    })
}

pub fn pod_list(items: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({"kind": "PodList", "metadata": {}, "items": items})
}

pub fn catalog_entry(node: &str, service_id: &str, address: &str, port: u16) -> serde_json::Value {
    serde_json::json!({
        "ID": "40e4a748-2192-161a-0510-9bf59fe950b5",
        "Node": node,
        "Address": "192.168.0.10",
        "Datacenter": "dc1",
        "ServiceID": service_id,
        "ServiceName": "web",
        "ServiceAddress": address,
        "ServicePort": port
    })
}
