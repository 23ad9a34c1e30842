//! # Octopus - command line entry point
//!
//! Resolves settings (defaults, settings file, environment, flags), runs one
//! command and maps its result to an exit status:
//!
//! - `0` success
//! - `1` fatal error (connection, status, configuration)
//! - `2` rejected input
//! - `3` drift found by `consul check --strict`

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use octopus::cli::Cli;
use octopus::commands::{self, EXIT_DRIFT, Outcome, Output};
use octopus_core::Settings;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let tag = cli.command.tag();
    match run(cli).await {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Drift) => ExitCode::from(EXIT_DRIFT),
        Err(e) => {
            eprintln!("[ {tag} ] [ ERROR ] {e:#}");
            ExitCode::from(commands::exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let settings = Settings::load(cli.config.as_deref())?.apply_overrides(cli.overrides());
    debug!(
        consul = %settings.consul.host,
        datacenter = %settings.consul.datacenter,
        namespace = %settings.kubernetes.namespace,
        kubeconfig = ?settings.kubernetes.kubeconfig,
        "Resolved settings"
    );

    let output = Output {
        json: cli.json,
        color: !cli.no_color && console::colors_enabled(),
    };
    commands::execute_command(cli.command, &settings, output).await
}

/// Initialize tracing to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
