//! Batch job specification
//!
//! The job is built as a typed document and serialized to YAML, never
//! assembled from text. Every rendered job runs its pod once: the pod never
//! restarts and the job never retries.

use launchpad_core::domain::naming::validate_resource_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SubmitFailure;

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "launchpad";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub api_version: String,
    pub kind: String,
    pub metadata: JobMetadata,
    pub spec: JobBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobBody {
    pub backoff_limit: u32,
    pub template: JobTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTemplate {
    pub metadata: JobMetadata,
    pub spec: PodSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub containers: Vec<ContainerSpec>,
    pub restart_policy: RestartPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    Never,
}

impl JobSpec {
    /// Renders the one-shot job for a deployment
    ///
    /// Both the job name and the container name must be valid cluster
    /// resource names.
    pub fn one_shot(job_name: &str, container_name: &str, image: &str) -> Result<Self, SubmitFailure> {
        validate_resource_name(job_name).map_err(SubmitFailure::InvalidName)?;
        validate_resource_name(container_name).map_err(SubmitFailure::InvalidName)?;

        let labels = BTreeMap::from([(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string())]);

        Ok(Self {
            api_version: "batch/v1".to_string(),
            kind: "Job".to_string(),
            metadata: JobMetadata {
                name: Some(job_name.to_string()),
                labels: labels.clone(),
            },
            spec: JobBody {
                backoff_limit: 0,
                template: JobTemplate {
                    metadata: JobMetadata { name: None, labels },
                    spec: PodSpec {
                        containers: vec![ContainerSpec {
                            name: container_name.to_string(),
                            image: image.to_string(),
                        }],
                        restart_policy: RestartPolicy::Never,
                    },
                },
            },
        })
    }

    pub fn to_yaml(&self) -> Result<String, SubmitFailure> {
        Ok(serde_yaml::to_string(self)?)
    }
}
