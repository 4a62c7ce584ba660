//! Launchpad CLI
//!
//! Command-line interface for running code through the build-and-run
//! pipeline, either in-process or through a Launchpad server.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Build, ship and run code as a one-shot cluster job", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "LAUNCHPAD_SERVER_URL", default_value = "http://localhost:8000")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Pipeline progress goes to stderr so stdout carries only the result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "launchpad_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
