// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(missing_docs)]

mod check;
mod deployment;
mod plan;
mod simulate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use platform::board::BUTTERSTICK;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "ButterStick bring-up development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Elaborate a deployment: PLL parameters, domain taps, VCCIO thresholds
    Plan {
        #[command(flatten)]
        deployment: deployment::DeploymentArgs,
        /// Also list the EHXPLLL instance parameters and attributes
        #[arg(long)]
        primitive: bool,
    },
    /// Run the bring-up model reference cycle by reference cycle
    Simulate {
        #[command(flatten)]
        deployment: deployment::DeploymentArgs,
        /// Reference cycles to run (default: until lock plus one carrier period)
        #[arg(long)]
        cycles: Option<u32>,
        /// PLL settle period in reference cycles (default: 15 ms of reference)
        #[arg(long)]
        lock_latency: Option<u32>,
        /// Drop the reference on this cycle (repeatable)
        #[arg(long = "dropout")]
        dropouts: Vec<u32>,
    },
    /// Check no_std builds, clippy and formatting
    Check,
    /// Run all tests (unit, integration and property tests)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            deployment,
            primitive,
        } => plan::run(&BUTTERSTICK, &deployment.resolve()?, primitive),
        Commands::Simulate {
            deployment,
            cycles,
            lock_latency,
            dropouts,
        } => simulate::run(
            &BUTTERSTICK,
            &deployment.resolve()?,
            &simulate::SimulationOptions {
                cycles,
                lock_latency,
                dropouts,
            },
        ),
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
    }
}
