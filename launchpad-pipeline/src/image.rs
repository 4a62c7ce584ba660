//! Image build and publish
//!
//! Both stages shell out to the container tool with the same image
//! reference. Neither retries; a partially pushed image is left as is.

use launchpad_core::dto::build_run::BuildRunRequest;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::process::{CommandRunner, Invocation, run_checked};

/// Image reference: `<registry>/<project>/<deploymentName>:<label>`
pub fn image_tag(config: &PipelineConfig, deployment_name: &str) -> String {
    format!(
        "{}/{}/{}:{}",
        config.registry, config.project_id, deployment_name, config.image_label
    )
}

/// `docker build -f <dockerfile> -t <tag> <context>`, run from the work directory
pub fn build_invocation(config: &PipelineConfig, request: &BuildRunRequest, tag: &str) -> Invocation {
    Invocation::new(&config.tools.docker)
        .args([
            "build",
            "-f",
            request.dockerfile_path.as_str(),
            "-t",
            tag,
            request.context_path.as_str(),
        ])
        .current_dir(&config.work_dir)
}

/// `docker push <tag>`
pub fn push_invocation(config: &PipelineConfig, tag: &str) -> Invocation {
    Invocation::new(&config.tools.docker).args(["push", tag])
}

/// Builds the image for a request
pub async fn build(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    request: &BuildRunRequest,
    tag: &str,
) -> Result<(), PipelineError> {
    info!("Building image {}", tag);
    run_checked(runner, &build_invocation(config, request, tag))
        .await
        .map_err(PipelineError::Build)?;
    info!("Image {} built", tag);
    Ok(())
}

/// Pushes a built image to the registry
pub async fn publish(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    tag: &str,
) -> Result<(), PipelineError> {
    info!("Pushing image {}", tag);
    run_checked(runner, &push_invocation(config, tag))
        .await
        .map_err(PipelineError::Publish)?;
    info!("Image {} pushed", tag);
    Ok(())
}
