//! Pipeline configuration
//!
//! Process-wide settings shared by every run: which project, cluster and
//! registry to target, where transient files go, and which tool binaries
//! to invoke. Read once at start-up, never per request.

use std::path::PathBuf;
use std::time::Duration;

/// Longest accepted job wait
pub const MAX_WAIT_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Locations of the external tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub docker: String,
    pub kubectl: String,
    pub gcloud: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            docker: "docker".to_string(),
            kubectl: "kubectl".to_string(),
            gcloud: "gcloud".to_string(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Cloud project that owns the registry namespace and the cluster
    pub project_id: String,

    /// Cluster the jobs run on
    pub cluster_name: String,

    /// Zone of the cluster
    pub zone: String,

    /// Registry host images are pushed to (e.g., "gcr.io")
    pub registry: String,

    /// Tag label appended to every image reference
    pub image_label: String,

    /// Directory that receives source files, job specs and kubeconfigs
    pub work_dir: PathBuf,

    /// How long to wait for a job to complete
    pub wait_timeout: Duration,

    pub tools: ToolConfig,
}

impl PipelineConfig {
    /// Creates a configuration for the given project and cluster with defaults
    pub fn new(project_id: String, cluster_name: String, zone: String) -> Self {
        Self {
            project_id,
            cluster_name,
            zone,
            registry: "gcr.io".to_string(),
            image_label: "latest".to_string(),
            work_dir: PathBuf::from("."),
            wait_timeout: Duration::from_secs(120),
            tools: ToolConfig::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - GCP_PROJECT_ID (default: your-project-id)
    /// - GKE_CLUSTER_NAME (default: your-gke-cluster)
    /// - GKE_ZONE (default: us-central1-a)
    /// - LAUNCHPAD_REGISTRY (default: gcr.io)
    /// - LAUNCHPAD_IMAGE_LABEL (default: latest)
    /// - LAUNCHPAD_WORK_DIR (default: .)
    /// - LAUNCHPAD_WAIT_TIMEOUT (seconds, default: 120)
    /// - LAUNCHPAD_DOCKER_BIN, LAUNCHPAD_KUBECTL_BIN, LAUNCHPAD_GCLOUD_BIN
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let wait_timeout = lookup("LAUNCHPAD_WAIT_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.wait_timeout);

        Self {
            project_id: string("GCP_PROJECT_ID", &defaults.project_id),
            cluster_name: string("GKE_CLUSTER_NAME", &defaults.cluster_name),
            zone: string("GKE_ZONE", &defaults.zone),
            registry: string("LAUNCHPAD_REGISTRY", &defaults.registry),
            image_label: string("LAUNCHPAD_IMAGE_LABEL", &defaults.image_label),
            work_dir: lookup("LAUNCHPAD_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            wait_timeout,
            tools: ToolConfig {
                docker: string("LAUNCHPAD_DOCKER_BIN", &defaults.tools.docker),
                kubectl: string("LAUNCHPAD_KUBECTL_BIN", &defaults.tools.kubectl),
                gcloud: string("LAUNCHPAD_GCLOUD_BIN", &defaults.tools.gcloud),
            },
        }
    }

    /// Sets the work directory
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.project_id.is_empty() {
            anyhow::bail!("project_id cannot be empty");
        }

        if self.cluster_name.is_empty() {
            anyhow::bail!("cluster_name cannot be empty");
        }

        if self.zone.is_empty() {
            anyhow::bail!("zone cannot be empty");
        }

        if self.registry.is_empty() || self.registry.ends_with('/') {
            anyhow::bail!("registry must be a host name without a trailing '/'");
        }

        if self.image_label.is_empty() {
            anyhow::bail!("image_label cannot be empty");
        }

        if self.wait_timeout.as_secs() == 0 {
            anyhow::bail!("wait_timeout must be greater than 0");
        }

        if self.wait_timeout > MAX_WAIT_TIMEOUT {
            anyhow::bail!(
                "wait_timeout cannot exceed {}s",
                MAX_WAIT_TIMEOUT.as_secs()
            );
        }

        if self.tools.docker.is_empty() || self.tools.kubectl.is_empty() || self.tools.gcloud.is_empty()
        {
            anyhow::bail!("tool paths cannot be empty");
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(
            "your-project-id".to_string(),
            "your-gke-cluster".to_string(),
            "us-central1-a".to_string(),
        )
    }
}
