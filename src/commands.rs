//! CLI command handlers.
//!
//! Every handler receives the resolved [`Settings`] explicitly and reports
//! failures as `anyhow` errors; the binary turns those into tagged stderr
//! messages and exit codes.

use std::sync::Arc;

use anyhow::{Context, Result};
use itertools::Itertools;
use octopus_consul::{ConsulClient, ConsulConfig};
use octopus_core::{ServiceCatalog, ServiceRecord, Settings, WorkloadCatalog, WorkloadRecord};
use octopus_kube::KubeClient;
use octopus_reconciler::{ReconcileReport, ReconcilerBuilder};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{Commands, ConsulCommands, PodCommands, ServicesCommands};
use crate::table::{Cell, RowStyle, Table};

/// Exit status for fatal errors.
pub const EXIT_FATAL: u8 = 1;
/// Exit status for rejected input.
pub const EXIT_VALIDATION: u8 = 2;
/// Exit status for `consul check --strict` when drift was found.
pub const EXIT_DRIFT: u8 = 3;

const DEFAULT_NAMESPACE: &str = "default";

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Output {
    pub json: bool,
    pub color: bool,
}

/// What a successful command observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// Drift found and strict checking requested.
    Drift,
}

/// Execute a CLI command.
///
/// This is the main command dispatcher that routes to the appropriate handler.
///
/// # Errors
///
/// Returns the handler's error; see [`exit_code`] for how it is classified.
pub async fn execute_command(
    command: Commands,
    settings: &Settings,
    output: Output,
) -> Result<Outcome> {
    match command {
        Commands::Consul(consul) => match consul.command {
            ConsulCommands::Services {
                command: ServicesCommands::All,
            } => cmd_services_all(settings, output).await,

            ConsulCommands::Services {
                command: ServicesCommands::Get { service },
            } => cmd_services_get(settings, &service, output).await,

            ConsulCommands::Check {
                service,
                prefix,
                strict,
                ..
            } => cmd_check(settings, &service, &prefix, strict, output).await,

            ConsulCommands::Deregister { node, service, .. } => {
                cmd_deregister(
                    settings,
                    node.as_deref().unwrap_or_default(),
                    service.as_deref().unwrap_or_default(),
                    output,
                )
                .await
            }
        },

        Commands::Pod { command } => match command {
            PodCommands::All { .. } => cmd_pod_all(settings, output).await,
            PodCommands::Get { prefix, .. } => cmd_pod_get(settings, &prefix, output).await,
        },
    }
}

/// Map an error to the process exit status.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    let validation = error.chain().any(|cause| {
        cause
            .downcast_ref::<octopus_core::Error>()
            .is_some_and(octopus_core::Error::is_validation)
    });
    if validation {
        EXIT_VALIDATION
    } else {
        EXIT_FATAL
    }
}

fn consul_client(settings: &Settings) -> Result<ConsulClient> {
    ConsulConfig::from_settings(&settings.consul)
        .and_then(ConsulClient::with_config)
        .map_err(octopus_core::Error::from)
        .context("failed to configure Consul client")
}

fn kube_client(settings: &Settings) -> Result<KubeClient> {
    KubeClient::from_kubeconfig(
        settings.kubernetes.kubeconfig.as_deref(),
        settings.kubernetes.timeout(),
    )
    .map_err(octopus_core::Error::from)
    .context("failed to load Kubernetes configuration")
}

/// List every registered service name.
async fn cmd_services_all(settings: &Settings, output: Output) -> Result<Outcome> {
    info!(host = %settings.consul.host, "Listing services");

    let services: Vec<String> = consul_client(settings)?
        .fetch_services()
        .await?
        .into_iter()
        .sorted()
        .dedup()
        .collect();

    if output.json {
        print_json(&services)?;
    } else {
        services_table(&services).print(output.color);
    }
    Ok(Outcome::Clean)
}

/// Show every instance of one service.
async fn cmd_services_get(settings: &Settings, service: &str, output: Output) -> Result<Outcome> {
    require("service", service, "please specify a service name")?;
    info!(host = %settings.consul.host, service, "Fetching service detail");

    let records = consul_client(settings)?
        .fetch_service_detail(service)
        .await?;

    if output.json {
        print_json(&records)?;
    } else {
        service_detail_table(&records, service).print(output.color);
    }
    Ok(Outcome::Clean)
}

/// Reconcile one service against the pods of a namespace.
async fn cmd_check(
    settings: &Settings,
    service: &str,
    prefix: &str,
    strict: bool,
    output: Output,
) -> Result<Outcome> {
    require("service", service, "please specify a service name")?;
    let namespace = settings.kubernetes.namespace.as_str();

    let reconciler = ReconcilerBuilder::new()
        .with_services(Arc::new(consul_client(settings)?))
        .with_workloads(Arc::new(kube_client(settings)?))
        .build()?;

    let report = reconciler.reconcile(service, namespace, prefix).await?;

    if output.json {
        print_json(&report)?;
    } else {
        report_table(&report).print(output.color);
    }

    if strict && !report.is_converged() {
        Ok(Outcome::Drift)
    } else {
        Ok(Outcome::Clean)
    }
}

/// Remove one service instance from the catalog.
async fn cmd_deregister(
    settings: &Settings,
    node: &str,
    service: &str,
    output: Output,
) -> Result<Outcome> {
    if node.is_empty() || service.is_empty() {
        return Err(octopus_core::Error::validation(
            "node/service",
            "please specify node or service name",
        )
        .into());
    }
    let datacenter = settings.consul.datacenter.as_str();
    debug!(datacenter, node, service, "Deregistering service");

    consul_client(settings)?
        .deregister(datacenter, node, service)
        .await
        .map_err(octopus_core::Error::from)?;

    if output.json {
        print_json(&DeregisterSummary {
            datacenter,
            node,
            service,
            deregistered: true,
        })?;
    } else {
        println!();
        println!(
            "[ CONSUL ] Service has been deregistered successfully, datacenter={datacenter} node={node} service={service}"
        );
    }
    Ok(Outcome::Clean)
}

/// List every pod of a namespace.
async fn cmd_pod_all(settings: &Settings, output: Output) -> Result<Outcome> {
    let namespace = settings.kubernetes.namespace.as_str();
    info!(namespace, "Listing pods");

    let pods = kube_client(settings)?.list_workloads(namespace).await?;

    if output.json {
        print_json(&pods)?;
    } else {
        pods_table(&pods, "", NamespaceEmphasis::Always).print(output.color);
    }
    Ok(Outcome::Clean)
}

/// List the pods of a namespace whose name starts with `prefix`.
async fn cmd_pod_get(settings: &Settings, prefix: &str, output: Output) -> Result<Outcome> {
    let namespace = settings.kubernetes.namespace.as_str();
    info!(namespace, prefix, "Listing pods by prefix");

    let pods = kube_client(settings)?
        .list_workloads_by_prefix(namespace, prefix)
        .await?;

    if output.json {
        print_json(&pods)?;
    } else {
        pods_table(&pods, prefix, NamespaceEmphasis::NonDefault).print(output.color);
    }
    Ok(Outcome::Clean)
}

fn require(field: &str, value: &str, reason: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(octopus_core::Error::validation(field, reason).into());
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct DeregisterSummary<'a> {
    datacenter: &'a str,
    node: &'a str,
    service: &'a str,
    deregistered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamespaceEmphasis {
    Always,
    NonDefault,
}

fn services_table(services: &[String]) -> Table {
    let mut table = Table::new(["SERVICES"]);
    for service in services {
        table.push_row([service.as_str()], RowStyle::Plain);
    }
    table
}

fn service_detail_table(records: &[ServiceRecord], service: &str) -> Table {
    let mut table = Table::new(["NODE", "ADDR", "SERVICE ID", "SERVICE ADDR", "SERVICE PORT"]);
    for record in records {
        table.push_row(
            [
                Cell::plain(&record.node),
                Cell::plain(&record.node_address),
                Cell::highlighted(&record.service_id, service),
                Cell::plain(&record.service_address),
                Cell::plain(record.service_port.clone().unwrap_or_default()),
            ],
            RowStyle::Plain,
        );
    }
    table
}

fn report_table(report: &ReconcileReport) -> Table {
    let mut table = Table::new([
        "NODE",
        "SERVICE ID",
        "SERVICE ADDR",
        "POD SERVICE ADDR",
        "POD SERVICE ID",
    ]);
    for row in &report.rows {
        table.push_row(
            [
                row.node.as_str(),
                row.service_id.as_str(),
                row.service_address.as_str(),
                row.workload_address.as_str(),
                row.workload_id.as_str(),
            ],
            RowStyle::from(row.status),
        );
    }
    table
}

fn pods_table(pods: &[WorkloadRecord], prefix: &str, emphasis: NamespaceEmphasis) -> Table {
    let mut table = Table::new(["NAMESPACE", "NODE", "SERVICE ID", "SERVICE ADDR"]);
    for pod in pods {
        let namespace = match emphasis {
            NamespaceEmphasis::NonDefault if pod.namespace == DEFAULT_NAMESPACE => {
                Cell::plain(&pod.namespace)
            }
            _ => Cell::emphasized(&pod.namespace),
        };
        table.push_row(
            [
                namespace,
                Cell::plain(&pod.node),
                Cell::highlighted(&pod.workload_id, prefix),
                Cell::plain(&pod.workload_address),
            ],
            RowStyle::Plain,
        );
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopus_core::Backend;
    use octopus_reconciler::{MatchPolicy, diff};

    #[test]
    fn test_validation_errors_exit_2() {
        let err = anyhow::Error::from(octopus_core::Error::validation("node", "missing"));
        assert_eq!(exit_code(&err), EXIT_VALIDATION);
    }

    #[test]
    fn test_wrapped_validation_errors_exit_2() {
        let err = anyhow::Error::from(octopus_core::Error::validation("node", "missing"))
            .context("deregister failed");
        assert_eq!(exit_code(&err), EXIT_VALIDATION);
    }

    #[test]
    fn test_backend_errors_exit_1() {
        let err = anyhow::Error::from(octopus_core::Error::status(Backend::Consul, 500, "boom"));
        assert_eq!(exit_code(&err), EXIT_FATAL);

        let err = anyhow::Error::from(octopus_reconciler::Error::workload_fetch_failed(
            "default",
            octopus_core::Error::connection(Backend::Kubernetes, "refused"),
        ));
        assert_eq!(exit_code(&err), EXIT_FATAL);
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("service", "  ", "please specify a service name").is_err());
        assert!(require("service", "web", "please specify a service name").is_ok());
    }

    #[test]
    fn test_services_table_has_one_row_per_service() {
        let table = services_table(&["api".to_string(), "web".to_string()]);
        assert_eq!(table.len(), 2);
        assert!(table.render(false).contains("| web      |"));
    }

    #[test]
    fn test_service_detail_table_renders_port() {
        let records = [ServiceRecord::new("node1", "web-1", "10.0.0.1")
            .with_node_address("192.168.0.1")
            .with_port("8080")];
        let rendered = service_detail_table(&records, "web").render(false);
        assert!(rendered.contains("| node1 | 192.168.0.1 | web-1      | 10.0.0.1     | 8080         |"));
    }

    #[test]
    fn test_report_table_follows_row_order() {
        let services = [ServiceRecord::new("node1", "web-1", "10.0.0.1")];
        let workloads = [WorkloadRecord::new("default", "node2", "web-2", "10.0.0.2")];
        let rows = diff(&services, &workloads, "web", &MatchPolicy::default());
        let report = ReconcileReport::new(rows, 1, 1);

        let rendered = report_table(&report).render(false);
        let first = rendered.find("web-1");
        let second = rendered.find("web-2");
        assert!(first.is_some() && second.is_some() && first < second);
    }

    #[test]
    fn test_pods_table_emphasizes_non_default_namespace_only() {
        let pods = [
            WorkloadRecord::new("default", "node1", "web-1", "10.0.0.1"),
            WorkloadRecord::new("payments", "node1", "web-2", "10.0.0.2"),
        ];
        let rendered = pods_table(&pods, "", NamespaceEmphasis::NonDefault).render(true);
        let default_line = rendered.lines().find(|l| l.contains("web-1"));
        let payments_line = rendered.lines().find(|l| l.contains("web-2"));
        assert!(default_line.is_some_and(|l| !l.contains('\u{1b}')));
        assert!(payments_line.is_some_and(|l| l.contains('\u{1b}')));
    }
}
