//! Service layer
//!
//! The orchestrator that sequences the pipeline stages. Trait-based so the
//! HTTP layer can be tested against a stand-in implementation.

mod pipeline;

pub use pipeline::{PipelineRun, PipelineService, StandardPipelineService};
