//! End-to-end tests for the octopus binary.
//!
//! These tests verify that:
//! - Commands render tables and JSON from mocked Consul and Kubernetes APIs
//! - Failures are tagged on stderr and never leave a partial table on stdout
//! - Exit codes distinguish fatal errors, rejected input and strict drift

#![forbid(clippy::unwrap_used)]
#![forbid(clippy::expect_used)]

mod common;

use common::{Sandbox, TestResult, catalog_entry, pod, pod_list, run, stderr, stdout};
use predicates::prelude::*;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// # GIVEN
/// No arguments beyond `--help`
///
/// # WHEN
/// The binary runs
///
/// # THEN
/// Both command groups are listed
#[test]
fn test_help_lists_command_groups() -> TestResult {
    Sandbox::new()?
        .octopus()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("consul").and(predicate::str::contains("pod")));
    Ok(())
}

/// # GIVEN
/// A deregister request without a node
///
/// # WHEN
/// The command runs
///
/// # THEN
/// It exits 2 with a tagged message and sends nothing
#[test]
fn test_deregister_without_node_is_rejected() -> TestResult {
    Sandbox::new()?
        .octopus()?
        .args(["consul", "--host", "127.0.0.1:9", "deregister", "-s", "web-1"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("[ CONSUL ] [ ERROR ]")
                .and(predicate::str::contains("please specify node or service name")),
        );
    Ok(())
}

#[test]
fn test_check_requires_service_flag() -> TestResult {
    Sandbox::new()?
        .octopus()?
        .args(["consul", "check"])
        .assert()
        .code(2);
    Ok(())
}

/// # GIVEN
/// A Consul catalog with two services in reverse order
///
/// # WHEN
/// `consul services all` runs
///
/// # THEN
/// The names are printed in a bordered table, sorted
#[tokio::test]
async fn test_services_all_prints_sorted_table() -> TestResult {
    let consul = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "web": ["v1"],
            "api": []
        })))
        .mount(&consul)
        .await;

    let sandbox = Sandbox::new()?;
    let mut cmd = sandbox.octopus()?;
    cmd.args(["consul", "--host", &consul.uri(), "services", "all"]);
    let output = run(cmd).await?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let table = stdout(&output);
    assert!(table.contains("| SERVICES |"));
    let api = table.find("| api ");
    let web = table.find("| web ");
    assert!(api.is_some() && web.is_some() && api < web);
    Ok(())
}

#[tokio::test]
async fn test_services_all_json() -> TestResult {
    let consul = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "web": [],
            "api": []
        })))
        .mount(&consul)
        .await;

    let sandbox = Sandbox::new()?;
    let mut cmd = sandbox.octopus()?;
    cmd.args(["--json", "consul", "--host", &consul.uri(), "services", "all"]);
    let output = run(cmd).await?;

    assert!(output.status.success());
    let names: Vec<String> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(names, vec!["api", "web"]);
    Ok(())
}

#[tokio::test]
async fn test_services_get_shows_instance_detail() -> TestResult {
    let consul = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog/service/web"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([catalog_entry("node1", "web-1", "10.0.0.1", 8080)])),
        )
        .mount(&consul)
        .await;

    let sandbox = Sandbox::new()?;
    let mut cmd = sandbox.octopus()?;
    cmd.args(["consul", "--host", &consul.uri(), "services", "get", "web"]);
    let output = run(cmd).await?;

    assert!(output.status.success());
    let table = stdout(&output);
    assert!(table.contains("SERVICE PORT"));
    assert!(table.contains("| node1 | 192.168.0.10 | web-1"));
    assert!(table.contains("8080"));
    assert!(!table.contains('\u{1b}'));
    Ok(())
}

/// # GIVEN
/// One registered instance with a pod, and one pod nobody registered
///
/// # WHEN
/// `consul check --strict` runs
///
/// # THEN
/// Both rows are reported and the exit status is 3
#[tokio::test]
async fn test_strict_check_reports_drift() -> TestResult {
    let consul = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog/service/web"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([catalog_entry("node1", "web-1", "10.0.0.1", 80)])),
        )
        .mount(&consul)
        .await;

    let cluster = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pod_list(vec![
            pod("web-1", "default", "node1", "10.0.0.1"),
            pod("web-2", "default", "node2", "10.0.0.2"),
            pod("api-1", "default", "node2", "10.0.0.3"),
        ])))
        .mount(&cluster)
        .await;

    let sandbox = Sandbox::new()?;
    let kubeconfig = sandbox.write_kubeconfig(&cluster.uri())?;
    let mut cmd = sandbox.octopus()?;
    cmd.arg("--json")
        .arg("--kubeconfig")
        .arg(&kubeconfig)
        .args(["consul", "--host", &consul.uri(), "check", "-s", "web", "-p", "web", "--strict"]);
    let output = run(cmd).await?;

    assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["matched"], 1);
    assert_eq!(report["registry_only"], 0);
    assert_eq!(report["workload_only"], 1);
    assert_eq!(report["rows"][1]["workload_id"], "web-2");
    assert_eq!(report["rows"][1]["status"], "workload_only");
    Ok(())
}

#[tokio::test]
async fn test_converged_check_exits_zero() -> TestResult {
    let consul = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog/service/web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            catalog_entry("node1", "web-1-web", "10.0.0.1", 80)
        ])))
        .mount(&consul)
        .await;

    let cluster = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/payments/pods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pod_list(vec![pod(
            "web-1", "payments", "node1", "10.0.0.1",
        )])))
        .mount(&cluster)
        .await;

    let sandbox = Sandbox::new()?;
    let kubeconfig = sandbox.write_kubeconfig(&cluster.uri())?;
    let mut cmd = sandbox.octopus()?;
    cmd.arg("--kubeconfig").arg(&kubeconfig).args([
        "consul", "--host", &consul.uri(), "check", "-s", "web", "-n", "payments", "-p", "web",
        "--strict",
    ]);
    let output = run(cmd).await?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let table = stdout(&output);
    assert!(table.contains("POD SERVICE ID"));
    assert!(table.contains("web-1-web"));
    Ok(())
}

/// # GIVEN
/// A Consul address nothing listens on
///
/// # WHEN
/// `consul check` runs
///
/// # THEN
/// It exits 1 with a tagged error and prints no table
#[tokio::test]
async fn test_unreachable_consul_is_fatal() -> TestResult {
    let cluster = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pod_list(vec![])))
        .mount(&cluster)
        .await;

    let sandbox = Sandbox::new()?;
    let kubeconfig = sandbox.write_kubeconfig(&cluster.uri())?;
    let mut cmd = sandbox.octopus()?;
    cmd.arg("--kubeconfig")
        .arg(&kubeconfig)
        .args(["consul", "--host", "127.0.0.1:9", "check", "-s", "web"]);
    let output = run(cmd).await?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("[ CONSUL ] [ ERROR ]"));
    Ok(())
}

#[tokio::test]
async fn test_deregister_sends_request() -> TestResult {
    let consul = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/catalog/deregister"))
        .and(body_json(serde_json::json!({
            "Datacenter": "dc2",
            "Node": "node1",
            "ServiceID": "web-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .expect(1)
        .mount(&consul)
        .await;

    let sandbox = Sandbox::new()?;
    let mut cmd = sandbox.octopus()?;
    cmd.args([
        "consul", "--host", &consul.uri(), "deregister", "-d", "dc2", "-n", "node1", "-s", "web-1",
    ]);
    let output = run(cmd).await?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains(
        "Service has been deregistered successfully, datacenter=dc2 node=node1 service=web-1"
    ));
    Ok(())
}

#[tokio::test]
async fn test_deregister_failure_reports_status_code() -> TestResult {
    let consul = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/catalog/deregister"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Unknown service"))
        .mount(&consul)
        .await;

    let sandbox = Sandbox::new()?;
    let mut cmd = sandbox.octopus()?;
    cmd.args(["consul", "--host", &consul.uri(), "deregister", "-n", "node1", "-s", "web-1"]);
    let output = run(cmd).await?;

    assert_eq!(output.status.code(), Some(1));
    let message = stderr(&output);
    assert!(message.contains("[ CONSUL ] [ ERROR ]"));
    assert!(message.contains("500"));
    Ok(())
}

#[tokio::test]
async fn test_pod_get_filters_by_prefix() -> TestResult {
    let cluster = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pod_list(vec![
            pod("web-1", "default", "node1", "10.0.0.1"),
            pod("api-1", "default", "node1", "10.0.0.2"),
        ])))
        .mount(&cluster)
        .await;

    let sandbox = Sandbox::new()?;
    let kubeconfig = sandbox.write_kubeconfig(&cluster.uri())?;
    let mut cmd = sandbox.octopus()?;
    cmd.arg("--kubeconfig")
        .arg(&kubeconfig)
        .args(["pod", "get", "-p", "web"]);
    let output = run(cmd).await?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let table = stdout(&output);
    assert!(table.contains("web-1"));
    assert!(!table.contains("api-1"));
    Ok(())
}

#[test]
fn test_missing_kubeconfig_is_fatal() -> TestResult {
    let sandbox = Sandbox::new()?;
    sandbox
        .octopus()?
        .args(["pod", "all", "--kubeconfig", "/nonexistent/kubeconfig"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("[ POD ] [ ERROR ]"));
    Ok(())
}

/// # GIVEN
/// A settings file naming the Consul host
///
/// # WHEN
/// No `--host` flag is given
///
/// # THEN
/// The file's host is used
#[tokio::test]
async fn test_settings_file_supplies_consul_host() -> TestResult {
    let consul = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"db": []})))
        .expect(1)
        .mount(&consul)
        .await;

    let sandbox = Sandbox::new()?;
    let settings = sandbox.write_settings(&format!("[consul]\nhost = \"{}\"\n", consul.uri()))?;
    let mut cmd = sandbox.octopus()?;
    cmd.arg("--config")
        .arg(&settings)
        .args(["consul", "services", "all"]);
    let output = run(cmd).await?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("| db "));
    Ok(())
}
