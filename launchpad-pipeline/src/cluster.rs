//! Cluster client
//!
//! Credentials are fetched into a kubeconfig file owned by one run, and
//! every `kubectl` call names that file explicitly. Runs never share or
//! overwrite each other's cluster context.
//!
//! Operations covered:
//! - Authentication (credential fetch)
//! - Apply, wait, status, pod lookup, logs, delete

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::process::{CommandRunner, Invocation, ToolError, run_checked};

/// Directory under the work dir that holds per-run kubeconfigs
pub const KUBECONFIG_DIR: &str = ".launchpad/kube";

/// A single condition reported in a job's status
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobCondition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl JobCondition {
    fn is_true(&self, kind: &str) -> bool {
        self.kind == kind && self.status == "True"
    }
}

/// Conditions of a job as read back from the cluster
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobState {
    pub conditions: Vec<JobCondition>,
}

#[derive(Deserialize)]
struct JobObject {
    #[serde(default)]
    status: JobStatusBody,
}

#[derive(Default, Deserialize)]
struct JobStatusBody {
    #[serde(default)]
    conditions: Vec<JobCondition>,
}

impl JobState {
    /// Parses `kubectl get job -o json` output
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let job: JobObject = serde_json::from_str(json)?;
        Ok(Self {
            conditions: job.status.conditions,
        })
    }

    /// The `Failed=True` condition, if the job has failed
    pub fn failure(&self) -> Option<&JobCondition> {
        self.conditions.iter().find(|c| c.is_true("Failed"))
    }
}

/// Authenticated handle on the target cluster
///
/// Created by [`ClusterClient::authenticate`]; the kubeconfig file is
/// removed when the client is dropped.
pub struct ClusterClient {
    runner: Arc<dyn CommandRunner>,
    kubectl: String,
    kubeconfig: PathBuf,
}

impl ClusterClient {
    /// Fetches cluster credentials into a kubeconfig owned by this run
    pub async fn authenticate(
        runner: Arc<dyn CommandRunner>,
        config: &PipelineConfig,
        run_id: Uuid,
    ) -> Result<Self, ToolError> {
        let dir = config.work_dir.join(KUBECONFIG_DIR);
        let kubeconfig = dir.join(format!("{}.kubeconfig", run_id));
        let invocation = credentials_invocation(config, &kubeconfig);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| ToolError::Spawn {
                command: invocation.to_string(),
                source,
            })?;

        info!(
            "Fetching credentials for cluster {} ({}, project {})",
            config.cluster_name, config.zone, config.project_id
        );

        // Owning the path before the call means a partially written file is
        // still removed on drop.
        let client = Self {
            runner,
            kubectl: config.tools.kubectl.clone(),
            kubeconfig,
        };
        run_checked(client.runner.as_ref(), &invocation).await?;

        debug!("Credentials stored in {}", client.kubeconfig.display());
        Ok(client)
    }

    pub fn kubeconfig(&self) -> &Path {
        &self.kubeconfig
    }

    /// `kubectl --kubeconfig <file> <args...>`
    pub fn kubectl<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(&self.kubectl)
            .arg("--kubeconfig")
            .arg(self.kubeconfig.to_string_lossy())
            .args(args)
    }

    /// Creates or updates the resources described in a manifest file
    pub async fn apply_file(&self, manifest: &Path) -> Result<(), ToolError> {
        let output = run_checked(
            self.runner.as_ref(),
            &self.kubectl(["apply", "-f"]).arg(manifest.to_string_lossy()),
        )
        .await?;
        debug!("Applied {}: {}", manifest.display(), output.stdout.trim());
        Ok(())
    }

    /// Blocks until the job reports `Complete`, bounded by `timeout`
    pub async fn wait_for_complete(&self, job_name: &str, timeout: Duration) -> Result<(), ToolError> {
        run_checked(
            self.runner.as_ref(),
            &self.kubectl([
                "wait".to_string(),
                "--for=condition=complete".to_string(),
                format!("job/{}", job_name),
                format!("--timeout={}s", timeout.as_secs()),
            ]),
        )
        .await?;
        Ok(())
    }

    /// Reads the job's current conditions
    pub async fn job_status(&self, job_name: &str) -> Result<JobState, String> {
        let output = run_checked(
            self.runner.as_ref(),
            &self.kubectl(["get", "job", job_name, "-o", "json"]),
        )
        .await
        .map_err(|e| e.to_string())?;

        JobState::from_json(&output.stdout)
            .map_err(|e| format!("Failed to parse status of job {}: {}", job_name, e))
    }

    /// Names of the pods created for a job
    pub async fn job_pod_names(&self, job_name: &str) -> Result<Vec<String>, ToolError> {
        let output = run_checked(
            self.runner.as_ref(),
            &self.kubectl([
                "get".to_string(),
                "pods".to_string(),
                "-l".to_string(),
                format!("job-name={}", job_name),
                "-o".to_string(),
                "jsonpath={.items[*].metadata.name}".to_string(),
            ]),
        )
        .await?;

        Ok(output
            .stdout
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }

    /// Full log of a pod, as a single snapshot
    pub async fn pod_logs(&self, pod_name: &str) -> Result<String, ToolError> {
        let output = run_checked(self.runner.as_ref(), &self.kubectl(["logs", pod_name])).await?;
        Ok(output.stdout)
    }

    pub async fn delete_job(&self, job_name: &str) -> Result<(), ToolError> {
        run_checked(
            self.runner.as_ref(),
            &self.kubectl(["delete", "job", job_name]),
        )
        .await?;
        Ok(())
    }
}

impl Drop for ClusterClient {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.kubeconfig) {
            Ok(()) => debug!("Removed kubeconfig {}", self.kubeconfig.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove kubeconfig {}: {}",
                self.kubeconfig.display(),
                e
            ),
        }
    }
}

/// `gcloud container clusters get-credentials ...` writing into `kubeconfig`
pub fn credentials_invocation(config: &PipelineConfig, kubeconfig: &Path) -> Invocation {
    Invocation::new(&config.tools.gcloud)
        .args([
            "container",
            "clusters",
            "get-credentials",
            config.cluster_name.as_str(),
            "--zone",
            config.zone.as_str(),
            "--project",
            config.project_id.as_str(),
        ])
        .env("KUBECONFIG", kubeconfig.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;

    #[test]
    fn test_credentials_invocation() {
        let config = PipelineConfig::new("acme".into(), "batch".into(), "us-east1-b".into());
        let inv = credentials_invocation(&config, Path::new("/tmp/run.kubeconfig"));

        assert_eq!(inv.program, "gcloud");
        assert_eq!(
            inv.args,
            vec![
                "container",
                "clusters",
                "get-credentials",
                "batch",
                "--zone",
                "us-east1-b",
                "--project",
                "acme"
            ]
        );
        assert_eq!(
            inv.envs,
            vec![("KUBECONFIG".to_string(), "/tmp/run.kubeconfig".to_string())]
        );
    }

    #[test]
    fn test_job_state_failed() {
        let json = r#"{
            "metadata": {"name": "hello-job"},
            "status": {
                "failed": 1,
                "conditions": [
                    {"type": "FailureTarget", "status": "True", "reason": "BackoffLimitExceeded"},
                    {"type": "Failed", "status": "True", "reason": "BackoffLimitExceeded",
                     "message": "Job has reached the specified backoff limit"}
                ]
            }
        }"#;

        let state = JobState::from_json(json).unwrap();
        let failure = state.failure().unwrap();
        assert_eq!(failure.reason.as_deref(), Some("BackoffLimitExceeded"));
    }

    #[test]
    fn test_job_state_running_has_no_conditions() {
        let state = JobState::from_json(r#"{"status": {"active": 1}}"#).unwrap();
        assert!(state.failure().is_none());

        let state = JobState::from_json(r#"{"metadata": {}}"#).unwrap();
        assert!(state.conditions.is_empty());
    }

    #[test]
    fn test_job_state_ignores_false_conditions() {
        let json = r#"{"status": {"conditions": [
            {"type": "Failed", "status": "False"},
            {"type": "Complete", "status": "True"}
        ]}}"#;
        let state = JobState::from_json(json).unwrap();
        assert!(state.failure().is_none());
        assert!(state.conditions[1].is_true("Complete"));
    }

    #[tokio::test]
    async fn test_authenticated_calls_use_run_kubeconfig() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().with_work_dir(dir.path());
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond("get pods", ScriptedRunner::ok("hello-job-abcde"));

        let run_id = Uuid::new_v4();
        let client = ClusterClient::authenticate(runner.clone(), &config, run_id)
            .await
            .unwrap();
        let pods = client.job_pod_names("hello-job").await.unwrap();
        assert_eq!(pods, vec!["hello-job-abcde"]);

        let expected = dir
            .path()
            .join(KUBECONFIG_DIR)
            .join(format!("{}.kubeconfig", run_id));
        assert_eq!(client.kubeconfig(), expected.as_path());

        let calls = runner.calls();
        assert_eq!(
            calls[0].envs,
            vec![("KUBECONFIG".to_string(), expected.to_string_lossy().to_string())]
        );
        assert_eq!(calls[1].args[0], "--kubeconfig");
        assert_eq!(calls[1].args[1], expected.to_string_lossy());
        assert!(calls[1].args.contains(&"job-name=hello-job".to_string()));
    }

    #[tokio::test]
    async fn test_kubeconfig_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().with_work_dir(dir.path());
        let runner = Arc::new(ScriptedRunner::new());

        let client = ClusterClient::authenticate(runner, &config, Uuid::new_v4())
            .await
            .unwrap();
        let path = client.kubeconfig().to_path_buf();
        std::fs::write(&path, "apiVersion: v1").unwrap();

        drop(client);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_credential_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().with_work_dir(dir.path());
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(
            "get-credentials",
            ScriptedRunner::fail("ERROR: (gcloud) cluster not found"),
        );

        let err = ClusterClient::authenticate(runner, &config, Uuid::new_v4())
            .await
            .err()
            .unwrap();
        assert!(err.stderr().contains("cluster not found"));
    }
}
