//! Pipeline error taxonomy
//!
//! One variant per stage that can abort a run. Every variant carries the
//! diagnostic text of the tool or operation that failed. Cleanup failures
//! have no variant: they are logged and never returned.

use launchpad_core::domain::stage::Stage;
use std::path::PathBuf;
use thiserror::Error;

use crate::process::ToolError;

/// Fatal failure of one pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to write source file {}: {source}", .path.display())]
    Materialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Docker build failed: {0}")]
    Build(#[source] ToolError),

    #[error("Docker push failed: {0}")]
    Publish(#[source] ToolError),

    #[error("Cluster credential fetch failed: {0}")]
    Auth(#[source] ToolError),

    #[error("Job submission failed: {0}")]
    Submit(#[source] SubmitFailure),

    #[error("Job wait failed: {0}")]
    Wait(#[source] WaitFailure),

    #[error("Output retrieval failed: {0}")]
    Retrieve(#[source] RetrieveFailure),
}

impl PipelineError {
    /// Stage at which the run stopped
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Materialization { .. } => Stage::Materialize,
            PipelineError::Build(_) => Stage::Build,
            PipelineError::Publish(_) => Stage::Publish,
            PipelineError::Auth(_) => Stage::Authenticate,
            PipelineError::Submit(_) => Stage::Submit,
            PipelineError::Wait(_) => Stage::Wait,
            PipelineError::Retrieve(_) => Stage::Retrieve,
        }
    }
}

/// Why a job could not be submitted
#[derive(Debug, Error)]
pub enum SubmitFailure {
    #[error("invalid resource name: {0}")]
    InvalidName(String),

    #[error("failed to render job spec: {0}")]
    Render(#[from] serde_yaml::Error),

    #[error("failed to write job spec {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Apply(#[from] ToolError),
}

/// Why a submitted job did not reach the `Complete` condition
#[derive(Debug, Error)]
pub enum WaitFailure {
    /// The container ran and the job reported `Failed`
    #[error("job {job} failed: {reason}")]
    JobFailed { job: String, reason: String },

    /// Neither `Complete` nor `Failed` within the deadline
    #[error("job {job} did not complete within {timeout_secs}s: {detail}")]
    TimedOut {
        job: String,
        timeout_secs: u64,
        detail: String,
    },

    /// Waiting failed and the job status could not be read back
    #[error("job {job} did not complete and its status is unknown: {detail}")]
    Inconclusive { job: String, detail: String },
}

/// Why the job's output could not be fetched
#[derive(Debug, Error)]
pub enum RetrieveFailure {
    #[error("no pod found for job {job}")]
    NoPod { job: String },

    /// Retrieval stopped without producing a result
    #[error("retrieval for job {job} was interrupted: {detail}")]
    Interrupted { job: String, detail: String },

    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_failure(stderr: &str) -> ToolError {
        ToolError::Failed {
            command: "tool".to_string(),
            exit_code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_stage_mapping() {
        assert_eq!(PipelineError::Build(tool_failure("x")).stage(), Stage::Build);
        assert_eq!(
            PipelineError::Publish(tool_failure("x")).stage(),
            Stage::Publish
        );
        assert_eq!(
            PipelineError::Auth(tool_failure("x")).stage(),
            Stage::Authenticate
        );
        assert_eq!(
            PipelineError::Submit(SubmitFailure::InvalidName("x".into())).stage(),
            Stage::Submit
        );
        assert_eq!(
            PipelineError::Wait(WaitFailure::Inconclusive {
                job: "j".into(),
                detail: "d".into()
            })
            .stage(),
            Stage::Wait
        );
        assert_eq!(
            PipelineError::Retrieve(RetrieveFailure::NoPod { job: "j".into() }).stage(),
            Stage::Retrieve
        );
    }

    #[test]
    fn test_messages_include_tool_diagnostics() {
        let err = PipelineError::Build(tool_failure("COPY failed: file not found"));
        assert!(err.to_string().starts_with("Docker build failed"));
        assert!(err.to_string().contains("COPY failed: file not found"));

        let err = PipelineError::Submit(SubmitFailure::Apply(tool_failure("forbidden")));
        assert!(err.to_string().contains("forbidden"));
    }
}
