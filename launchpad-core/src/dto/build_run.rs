//! Build-and-run request/result DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::language::Language;

/// Default build recipe location
pub const DEFAULT_DOCKERFILE_PATH: &str = "./Dockerfile";

/// Default build context
pub const DEFAULT_CONTEXT_PATH: &str = ".";

/// Message returned with every successful run
pub const SUCCESS_MESSAGE: &str =
    "Container built, job executed, and output retrieved successfully";

/// Input to one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRunRequest {
    /// Declared language, e.g. "java" or "python"
    pub language: String,

    /// Source text, written verbatim
    pub code: String,

    /// Names the source file, image, job and container
    pub deployment_name: String,

    #[serde(default = "default_dockerfile_path")]
    pub dockerfile_path: String,

    #[serde(default = "default_context_path")]
    pub context_path: String,
}

fn default_dockerfile_path() -> String {
    DEFAULT_DOCKERFILE_PATH.to_string()
}

fn default_context_path() -> String {
    DEFAULT_CONTEXT_PATH.to_string()
}

impl BuildRunRequest {
    /// Creates a request with the default Dockerfile and context paths
    pub fn new(
        language: impl Into<String>,
        code: impl Into<String>,
        deployment_name: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            deployment_name: deployment_name.into(),
            dockerfile_path: default_dockerfile_path(),
            context_path: default_context_path(),
        }
    }

    pub fn language(&self) -> Language {
        Language::classify(&self.language)
    }
}

/// Output of a successful pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRunResult {
    pub job_name: String,
    pub pod_name: String,
    pub logs: String,
    pub message: String,
    pub run_id: Uuid,
    pub image_tag: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
