//! Panix Incremental - Development Tools

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "panix-tools")]
#[command(about = "Development tools for Panix Incremental")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file and/or an override file
    Validate {
        /// Full config RON file (built-in content if omitted)
        path: Option<PathBuf>,

        /// Override RON file merged on top of the config
        #[arg(short, long)]
        overrides: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path, overrides } => {
            match panix_tools::validate::validate_files(path.as_deref(), overrides.as_deref()) {
                Ok(summary) => {
                    for skipped in &summary.skipped_overrides {
                        tracing::warn!("Override {skipped} will be skipped: new ids need the custom_ prefix");
                    }
                    tracing::info!(
                        resources = summary.resources,
                        tile_types = summary.tile_types,
                        components = summary.components,
                        drones = summary.drones,
                        structures = summary.structures,
                        "Validation passed"
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    for problem in e.problems() {
                        tracing::error!("{problem}");
                    }
                    tracing::error!("Validation failed");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
