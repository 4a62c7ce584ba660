//! Launchpad Pipeline
//!
//! Packages a source payload into a container image, publishes it, runs it
//! as a one-shot cluster job and returns the job's output.
//!
//! Layout:
//! - Configuration: process-wide settings read once from the environment
//! - Process: external tool invocation with separately captured output
//! - Cluster: an explicit, per-run cluster client
//! - Stages: source materialization, image build/publish, job spec rendering
//! - Service: the orchestrator that sequences the stages and reaps the job

pub mod cluster;
pub mod config;
pub mod error;
pub mod image;
pub mod job_spec;
pub mod locks;
pub mod process;
pub mod service;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{PipelineConfig, ToolConfig};
pub use error::{PipelineError, RetrieveFailure, SubmitFailure, WaitFailure};
pub use process::{CommandOutput, CommandRunner, Invocation, ProcessRunner, ToolError};
pub use service::{PipelineService, StandardPipelineService};
