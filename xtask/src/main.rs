//! xtask - Development task runner for radix-vector
//!
//! Usage:
//!   cargo xtask scenario --file <yaml> [options]
//!   cargo xtask boundaries [--upto <length>]

mod boundaries;
mod scenario;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development task runner for radix-vector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a YAML scenario of pushes and updates and verify every version
    Scenario(scenario::ScenarioArgs),
    /// Push sequential values and verify every index at each structural transition
    Boundaries(boundaries::BoundariesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scenario(args) => scenario::run(&args),
        Commands::Boundaries(args) => boundaries::run(&args),
    }
}
