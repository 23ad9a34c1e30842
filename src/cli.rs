//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use octopus_core::SettingsOverrides;

/// Octopus - Consul and Kubernetes drift checker
#[derive(Parser, Debug)]
#[command(name = "octopus")]
#[command(version)]
#[command(about = "Cross-check Consul service registrations against running Kubernetes pods")]
#[command(
    long_about = "Octopus lists Consul services and Kubernetes pods, reports which registrations have no running pod and which pods were never registered, and deregisters stale entries."
)]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Kubeconfig file
    #[arg(long, global = true, value_name = "FILE")]
    pub kubeconfig: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Flag values that override file and environment settings.
    pub fn overrides(&self) -> SettingsOverrides {
        let mut overrides = SettingsOverrides {
            kubeconfig: self.kubeconfig.clone(),
            ..SettingsOverrides::default()
        };

        match &self.command {
            Commands::Consul(consul) => {
                overrides.consul_host.clone_from(&consul.host);
                overrides.consul_token.clone_from(&consul.token);
                match &consul.command {
                    ConsulCommands::Check { namespace, .. } => {
                        overrides.namespace.clone_from(namespace);
                    }
                    ConsulCommands::Deregister { datacenter, .. } => {
                        overrides.datacenter.clone_from(datacenter);
                    }
                    ConsulCommands::Services { .. } => {}
                }
            }
            Commands::Pod { command } => match command {
                PodCommands::All { namespace } | PodCommands::Get { namespace, .. } => {
                    overrides.namespace.clone_from(namespace);
                }
            },
        }

        overrides
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run Consul-related commands
    Consul(ConsulArgs),

    /// Run Kubernetes pod-related commands
    Pod {
        #[command(subcommand)]
        command: PodCommands,
    },
}

impl Commands {
    /// Tag printed in front of this command's messages.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Consul(_) => "CONSUL",
            Self::Pod { .. } => "POD",
        }
    }
}

#[derive(Args, Debug)]
pub struct ConsulArgs {
    /// Consul address, `host:port` or a full URL [default: localhost:8500]
    #[arg(long)]
    pub host: Option<String>,

    /// Consul ACL token
    #[arg(long)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: ConsulCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConsulCommands {
    /// Get list of services from Consul
    Services {
        #[command(subcommand)]
        command: ServicesCommands,
    },

    /// Check which instances of a service have a running pod
    Check {
        /// Service name registered in Consul
        #[arg(short, long)]
        service: String,

        /// Namespace to list pods in [default: default]
        #[arg(short, long)]
        namespace: Option<String>,

        /// Pod name prefix
        #[arg(short = 'p', long = "pod-prefix", default_value = "")]
        prefix: String,

        /// Exit with status 3 when any drift is found
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Deregister an existing service instance
    Deregister {
        /// Consul datacenter [default: dc1]
        #[arg(short, long)]
        datacenter: Option<String>,

        /// Consul node
        #[arg(short, long)]
        node: Option<String>,

        /// Service ID registered in Consul
        #[arg(short, long)]
        service: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServicesCommands {
    /// Get all registered services
    All,

    /// Get service detail by service name
    Get {
        /// Service name
        service: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PodCommands {
    /// Get all existing pods
    All {
        /// Namespace [default: default]
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Get existing pods by name prefix
    Get {
        /// Namespace [default: default]
        #[arg(short, long)]
        namespace: Option<String>,

        /// Pod name prefix (e.g. withdrawal-service)
        #[arg(short, long, default_value = "")]
        prefix: String,
    },
}
