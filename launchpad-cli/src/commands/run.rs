//! In-process run
//!
//! Executes the pipeline directly, using the same environment-driven
//! configuration as the server.

use anyhow::{Context, Result};
use launchpad_pipeline::{
    PipelineConfig, PipelineService, ProcessRunner, StandardPipelineService,
};
use std::sync::Arc;

use super::RequestArgs;
use super::output::{print_failure, print_result};

pub async fn handle_run(args: RequestArgs, json: bool) -> Result<()> {
    let request = args.into_request()?;
    let config = PipelineConfig::from_env().context("Invalid pipeline configuration")?;
    let pipeline = StandardPipelineService::new(Arc::new(config), Arc::new(ProcessRunner::new()));

    match pipeline.build_run(request).await {
        Ok(result) => print_result(&result, json),
        Err(e) => {
            print_failure(&format!("{} stage", e.stage()), &e.to_string());
            Err(anyhow::anyhow!("Pipeline failed"))
        }
    }
}
