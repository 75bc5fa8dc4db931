//! Declarative host provisioning for the POS server.
//!
//! Reads the same config file as `pos-server`, reconciles the host with
//! the provisioning target state (packages installed, authbind port
//! grant in place, server launched), and verifies the server answers.
//! Run as root; the server itself ends up running as the unprivileged
//! service user.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};

use pos_server::config::{self, ServerConfig};
use pos_server::provision::service::wait_until_serving;
use pos_server::provision::steps::StepReport;
use pos_server::provision::{
    apply_all, plan, LaunchStep, PackageStep, PortGrantStep, Step, StepOutcome, StepStatus,
    SystemRunner,
};

#[derive(Parser)]
#[command(
    name = "pos-provision",
    about = "Reconcile a host with the POS server's provisioning target state",
    version
)]
struct Cli {
    /// Path to the TOML configuration file (shared with pos-server).
    #[arg(short, long, default_value = "pos.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which steps are satisfied and which would change the host
    Plan,
    /// Reconcile the host, launch the server, and verify it answers
    Apply {
        /// Stop after host state reconciliation; do not launch the server
        #[arg(long)]
        skip_launch: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;
    let address: SocketAddr = config.listener.bind_address.parse()?;
    let runner = SystemRunner;

    match cli.command {
        Commands::Plan => {
            let steps = build_steps(&config, &cli.config, address, false);
            for (name, status) in plan(&steps, &runner)? {
                match status {
                    StepStatus::Satisfied(reason) => println!("  ok       {name}: {reason}"),
                    StepStatus::Pending(reason) => println!("  pending  {name}: {reason}"),
                }
            }
        }
        Commands::Apply { skip_launch } => {
            let steps = build_steps(&config, &cli.config, address, skip_launch);
            let reports = match apply_all(&steps, &runner) {
                Ok(reports) => reports,
                Err(error) => {
                    for report in &error.completed {
                        print_report(report);
                    }
                    eprintln!("  failed   {}", error.step);
                    return Err(error.into());
                }
            };
            for report in &reports {
                print_report(report);
            }

            if !skip_launch {
                let timeout = Duration::from_secs(config.provision.verify_timeout_secs);
                wait_until_serving(address, timeout)?;
                println!("  ok       verify: server answering on {address}");
            }
        }
    }

    Ok(())
}

/// Assemble the ordered step list from the target state.
fn build_steps(
    config: &ServerConfig,
    config_path: &Path,
    address: SocketAddr,
    skip_launch: bool,
) -> Vec<Box<dyn Step>> {
    let provision = &config.provision;
    let mut steps: Vec<Box<dyn Step>> = Vec::new();

    if !provision.packages.is_empty() {
        steps.push(Box::new(PackageStep::new(provision.packages.clone())));
    }
    steps.push(Box::new(PortGrantStep::new(
        provision.authbind_dir.clone(),
        address.port(),
        provision.service_user.clone(),
    )));
    if !skip_launch {
        steps.push(Box::new(LaunchStep::new(
            provision.server_binary.clone(),
            config_path,
            address,
        )));
    }

    steps
}

fn print_report(report: &StepReport) {
    match &report.outcome {
        StepOutcome::Unchanged(reason) => println!("  ok       {}: {}", report.name, reason),
        StepOutcome::Changed(reason) => println!("  changed  {}: {}", report.name, reason),
    }
}
