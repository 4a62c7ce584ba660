//! Server-backed commands

use anyhow::Result;
use colored::*;
use launchpad_client::LaunchpadClient;

use super::RequestArgs;
use super::output::{print_failure, print_result};
use crate::config::Config;

pub async fn handle_submit(args: RequestArgs, json: bool, config: &Config) -> Result<()> {
    let request = args.into_request()?;
    let client = LaunchpadClient::new(&config.server_url);

    if !json {
        println!(
            "{}",
            format!(
                "Submitting {} to {}...",
                request.deployment_name,
                client.base_url()
            )
            .dimmed()
        );
    }

    match client.build_run(&request).await {
        Ok(result) => print_result(&result, json),
        Err(e) => {
            print_failure("server", &e.to_string());
            Err(anyhow::anyhow!("Pipeline failed"))
        }
    }
}

pub async fn handle_health(config: &Config) -> Result<()> {
    let client = LaunchpadClient::new(&config.server_url);
    client.health().await?;
    println!("{} {}", "✓".green(), format!("{} is healthy", client.base_url()).bold());
    Ok(())
}
