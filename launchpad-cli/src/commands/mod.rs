//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod output;
mod request;
mod run;
mod server;

pub use request::RequestArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline in this process
    Run {
        #[command(flatten)]
        request: RequestArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Submit the pipeline to a Launchpad server
    Submit {
        #[command(flatten)]
        request: RequestArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the server is reachable
    Health,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run { request, json } => run::handle_run(request, json).await,
        Commands::Submit { request, json } => server::handle_submit(request, json, config).await,
        Commands::Health => server::handle_health(config).await,
    }
}
