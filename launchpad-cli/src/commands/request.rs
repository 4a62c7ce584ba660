//! Request arguments shared by `run` and `submit`

use anyhow::{Context, Result};
use clap::Args;
use launchpad_core::dto::build_run::{
    BuildRunRequest, DEFAULT_CONTEXT_PATH, DEFAULT_DOCKERFILE_PATH,
};
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Deployment name; names the image, job and container
    #[arg(short, long)]
    pub name: String,

    /// Source language ("java" or anything else for a script)
    #[arg(short, long, default_value = "python")]
    pub language: String,

    /// File containing the code, or "-" for stdin
    pub code: PathBuf,

    /// Dockerfile path, relative to the work directory
    #[arg(long, default_value = DEFAULT_DOCKERFILE_PATH)]
    pub dockerfile: String,

    /// Build context, relative to the work directory
    #[arg(long, default_value = DEFAULT_CONTEXT_PATH)]
    pub context: String,
}

impl RequestArgs {
    /// Reads the code and assembles the request
    pub fn into_request(self) -> Result<BuildRunRequest> {
        let code = if self.code.as_os_str() == "-" {
            let mut code = String::new();
            std::io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read code from stdin")?;
            code
        } else {
            std::fs::read_to_string(&self.code)
                .with_context(|| format!("Failed to read code from {}", self.code.display()))?
        };

        Ok(BuildRunRequest {
            language: self.language,
            code,
            deployment_name: self.name,
            dockerfile_path: self.dockerfile,
            context_path: self.context,
        })
    }
}
