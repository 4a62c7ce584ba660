//! External tool invocation
//!
//! Every stage talks to its collaborator (container builder, registry,
//! cluster) by running a command-line tool. This module keeps exit code,
//! stdout and stderr apart so callers can decide what a failure means.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tracing::debug;

/// One external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Failure of an external tool
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {}", exit_status(.exit_code), .stderr.trim())]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl ToolError {
    /// Diagnostic text written by the tool, empty for spawn failures
    pub fn stderr(&self) -> &str {
        match self {
            ToolError::Spawn { .. } => "",
            ToolError::Failed { stderr, .. } => stderr,
        }
    }
}

/// Runs external commands
///
/// The production implementation spawns real processes; tests substitute a
/// scripted runner.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the invocation to completion and captures its output
    ///
    /// Only failure to start the process is an error here. A non-zero exit
    /// is reported through [`CommandOutput::exit_code`].
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ToolError>;
}

/// Runs an invocation and turns a non-zero exit into [`ToolError::Failed`]
pub async fn run_checked(
    runner: &dyn CommandRunner,
    invocation: &Invocation,
) -> Result<CommandOutput, ToolError> {
    let output = runner.run(invocation).await?;

    if !output.stdout.trim().is_empty() {
        debug!("{} stdout: {}", invocation.program, output.stdout.trim());
    }
    if !output.stderr.trim().is_empty() {
        debug!("{} stderr: {}", invocation.program, output.stderr.trim());
    }

    if output.success() {
        Ok(output)
    } else {
        Err(ToolError::Failed {
            command: invocation.to_string(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ToolError> {
        debug!("Running: {}", invocation);

        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|source| ToolError::Spawn {
            command: invocation.to_string(),
            source,
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display_quotes_whitespace() {
        let inv = Invocation::new("kubectl")
            .args(["get", "pods"])
            .arg("a b")
            .arg("");
        assert_eq!(inv.to_string(), "kubectl get pods 'a b' ''");
    }

    #[test]
    fn test_failed_error_carries_stderr() {
        let err = ToolError::Failed {
            command: "docker build .".to_string(),
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "no such file: Dockerfile\n".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("status 1"));
        assert!(msg.contains("no such file: Dockerfile"));
        assert_eq!(err.stderr(), "no such file: Dockerfile\n");
    }

    #[test]
    fn test_signal_exit_is_described() {
        let err = ToolError::Failed {
            command: "docker push x".to_string(),
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[tokio::test]
    async fn test_process_runner_captures_streams_separately() {
        let inv = Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = ProcessRunner::new().run(&inv).await.unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_run_checked_rejects_non_zero_exit() {
        let inv = Invocation::new("sh").args(["-c", "echo boom >&2; exit 1"]);
        let err = run_checked(&ProcessRunner::new(), &inv).await.unwrap_err();

        match err {
            ToolError::Failed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "boom\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let inv = Invocation::new("launchpad-definitely-not-a-real-binary");
        let err = ProcessRunner::new().run(&inv).await.unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }
}
