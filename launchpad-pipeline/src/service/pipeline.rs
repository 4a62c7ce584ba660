//! Pipeline orchestration
//!
//! Runs one request through
//! `Materialize -> Build -> Publish -> Authenticate -> Submit -> Wait -> Retrieve`,
//! stopping at the first failure. Once a job has been submitted it is
//! deleted exactly once, whatever happens afterwards, and a deletion
//! failure never changes the outcome. The post-submit stages run on their
//! own tasks, so even a panic in one of them still reaches the deletion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launchpad_core::domain::naming::job_name_for;
use launchpad_core::domain::stage::Stage;
use launchpad_core::dto::build_run::{BuildRunRequest, BuildRunResult, SUCCESS_MESSAGE};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::cluster::{ClusterClient, JobState};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, RetrieveFailure, SubmitFailure, WaitFailure};
use crate::image;
use crate::job_spec::JobSpec;
use crate::locks::DeploymentLocks;
use crate::process::CommandRunner;
use crate::source;

/// Extra time given to the wait tool beyond its own timeout
const WAIT_GRACE: Duration = Duration::from_secs(30);

/// Service trait for build-and-run requests
#[async_trait]
pub trait PipelineService: Send + Sync {
    /// Runs one request through the whole pipeline
    async fn build_run(&self, request: BuildRunRequest) -> Result<BuildRunResult, PipelineError>;
}

/// Names and paths derived for one run
///
/// Exists only while the run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub image_tag: String,
    pub job_name: String,
    pub source_path: PathBuf,
    pub job_spec_path: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl PipelineRun {
    pub fn plan(config: &PipelineConfig, request: &BuildRunRequest) -> Self {
        let job_name = job_name_for(&request.deployment_name);
        Self {
            run_id: Uuid::new_v4(),
            image_tag: image::image_tag(config, &request.deployment_name),
            source_path: config.work_dir.join(source::source_file_name(request)),
            job_spec_path: config.work_dir.join(format!("{}.yaml", job_name)),
            job_name,
            started_at: Utc::now(),
        }
    }
}

/// Standard implementation of PipelineService
pub struct StandardPipelineService {
    config: Arc<PipelineConfig>,
    runner: Arc<dyn CommandRunner>,
    locks: DeploymentLocks,
}

impl StandardPipelineService {
    /// Creates a new pipeline service
    ///
    /// # Arguments
    /// * `config` - Process-wide pipeline configuration
    /// * `runner` - How external tools are invoked
    pub fn new(config: Arc<PipelineConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            runner,
            locks: DeploymentLocks::new(),
        }
    }

    async fn execute(
        &self,
        run: &PipelineRun,
        request: &BuildRunRequest,
    ) -> Result<BuildRunResult, PipelineError> {
        let config = self.config.as_ref();
        let runner = self.runner.as_ref();

        log_stage(Stage::Materialize);
        source::materialize(&config.work_dir, request).await?;

        log_stage(Stage::Build);
        image::build(runner, config, request, &run.image_tag).await?;

        log_stage(Stage::Publish);
        image::publish(runner, config, &run.image_tag).await?;

        log_stage(Stage::Authenticate);
        let cluster = ClusterClient::authenticate(self.runner.clone(), config, run.run_id)
            .await
            .map_err(PipelineError::Auth)?;
        let cluster = Arc::new(cluster);

        log_stage(Stage::Submit);
        self.submit(&cluster, run, request)
            .await
            .map_err(PipelineError::Submit)?;
        info!("Job {} submitted", run.job_name);

        let outcome = self.wait_and_retrieve(&cluster, run).await;

        log_stage(Stage::Reap);
        reap(&cluster, &run.job_name).await;

        let (pod_name, logs) = outcome?;

        Ok(BuildRunResult {
            job_name: run.job_name.clone(),
            pod_name,
            logs,
            message: SUCCESS_MESSAGE.to_string(),
            run_id: run.run_id,
            image_tag: run.image_tag.clone(),
            started_at: run.started_at,
            completed_at: Utc::now(),
        })
    }

    /// Renders the job spec, writes it next to the source and applies it
    async fn submit(
        &self,
        cluster: &ClusterClient,
        run: &PipelineRun,
        request: &BuildRunRequest,
    ) -> Result<(), SubmitFailure> {
        let spec = JobSpec::one_shot(&run.job_name, &request.deployment_name, &run.image_tag)?;
        let yaml = spec.to_yaml()?;

        tokio::fs::write(&run.job_spec_path, yaml)
            .await
            .map_err(|source| SubmitFailure::Write {
                path: run.job_spec_path.clone(),
                source,
            })?;

        cluster.apply_file(&run.job_spec_path).await?;
        Ok(())
    }

    async fn wait_and_retrieve(
        &self,
        cluster: &Arc<ClusterClient>,
        run: &PipelineRun,
    ) -> Result<(String, String), PipelineError> {
        log_stage(Stage::Wait);
        let waited = {
            let cluster = cluster.clone();
            let job_name = run.job_name.clone();
            let timeout = self.config.wait_timeout;
            guarded(Stage::Wait, async move { wait(&cluster, &job_name, timeout).await }).await
        };
        match waited {
            Ok(result) => result.map_err(PipelineError::Wait)?,
            Err(detail) => {
                return Err(PipelineError::Wait(WaitFailure::Inconclusive {
                    job: run.job_name.clone(),
                    detail,
                }));
            }
        }
        info!("Job {} completed", run.job_name);

        log_stage(Stage::Retrieve);
        let retrieved = {
            let cluster = cluster.clone();
            let job_name = run.job_name.clone();
            guarded(Stage::Retrieve, async move { retrieve(&cluster, &job_name).await }).await
        };
        match retrieved {
            Ok(result) => result.map_err(PipelineError::Retrieve),
            Err(detail) => Err(PipelineError::Retrieve(RetrieveFailure::Interrupted {
                job: run.job_name.clone(),
                detail,
            })),
        }
    }
}

#[async_trait]
impl PipelineService for StandardPipelineService {
    async fn build_run(&self, request: BuildRunRequest) -> Result<BuildRunResult, PipelineError> {
        let _guard = self.locks.acquire(&request.deployment_name).await;

        let run = PipelineRun::plan(&self.config, &request);
        let span = tracing::info_span!(
            "build_run",
            run_id = %run.run_id,
            deployment = %request.deployment_name
        );

        async {
            info!(
                "Starting run: language={}, source={}, image={}, job={}",
                request.language(),
                run.source_path.display(),
                run.image_tag,
                run.job_name
            );

            match self.execute(&run, &request).await {
                Ok(result) => {
                    info!("Run succeeded: pod={}", result.pod_name);
                    Ok(result)
                }
                Err(e) => {
                    error!("Run failed at {} stage: {}", e.stage(), e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn log_stage(stage: Stage) {
    info!("Stage: {}", stage);
}

/// Runs a post-submit stage on its own task
///
/// A panic inside the stage comes back as an error describing it.
async fn guarded<T, F>(stage: Stage, stage_future: F) -> Result<T, String>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(stage_future.in_current_span())
        .await
        .map_err(|e| format!("{} stage aborted: {}", stage, e))
}

async fn wait(cluster: &ClusterClient, job_name: &str, timeout: Duration) -> Result<(), WaitFailure> {
    let deadline = timeout.saturating_add(WAIT_GRACE);

    let waited = tokio::time::timeout(deadline, cluster.wait_for_complete(job_name, timeout)).await;

    let wait_error = match waited {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("wait did not return within {}s", deadline.as_secs()),
    };

    let state = cluster.job_status(job_name).await;
    Err(classify_wait_failure(job_name, timeout, wait_error, state))
}

/// Decides why a wait ended without `Complete`
///
/// A `Failed=True` condition means the container itself failed. No such
/// condition means the job is still running or stuck. When the status
/// cannot be read, the outcome is inconclusive.
pub(crate) fn classify_wait_failure(
    job_name: &str,
    timeout: Duration,
    wait_error: String,
    state: Result<JobState, String>,
) -> WaitFailure {
    match state {
        Ok(state) => match state.failure() {
            Some(condition) => WaitFailure::JobFailed {
                job: job_name.to_string(),
                reason: match (&condition.reason, &condition.message) {
                    (Some(reason), Some(message)) => format!("{}: {}", reason, message),
                    (Some(reason), None) => reason.clone(),
                    (None, Some(message)) => message.clone(),
                    (None, None) => "Failed condition reported".to_string(),
                },
            },
            None => WaitFailure::TimedOut {
                job: job_name.to_string(),
                timeout_secs: timeout.as_secs(),
                detail: wait_error,
            },
        },
        Err(status_error) => WaitFailure::Inconclusive {
            job: job_name.to_string(),
            detail: format!("{}; status lookup failed: {}", wait_error, status_error),
        },
    }
}

async fn retrieve(cluster: &ClusterClient, job_name: &str) -> Result<(String, String), RetrieveFailure> {
    let pods = cluster.job_pod_names(job_name).await?;

    let pod_name = match pods.as_slice() {
        [] => {
            return Err(RetrieveFailure::NoPod {
                job: job_name.to_string(),
            });
        }
        [only] => only.clone(),
        [first, ..] => {
            warn!(
                "Job {} has {} pods, reading logs from {}",
                job_name,
                pods.len(),
                first
            );
            first.clone()
        }
    };

    let logs = cluster.pod_logs(&pod_name).await?;
    info!("Fetched {} bytes of logs from pod {}", logs.len(), pod_name);
    Ok((pod_name, logs))
}

/// Deletes the job; failures are logged and swallowed
async fn reap(cluster: &ClusterClient, job_name: &str) {
    match cluster.delete_job(job_name).await {
        Ok(()) => info!("Job {} deleted", job_name),
        Err(e) if !e.stderr().trim().is_empty() => {
            warn!("Failed to delete job {}: {}", job_name, e.stderr().trim())
        }
        Err(e) => warn!("Failed to delete job {}: {}", job_name, e),
    }
}
