//! Source materialization
//!
//! Writes the submitted code into the work directory so the image build can
//! pick it up from its context.

use launchpad_core::dto::build_run::BuildRunRequest;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::PipelineError;

/// File name of the materialized source: `<deploymentName><ext>`
pub fn source_file_name(request: &BuildRunRequest) -> String {
    format!(
        "{}{}",
        request.deployment_name,
        request.language().extension()
    )
}

/// Writes `request.code` verbatim to `<work_dir>/<deploymentName><ext>`
///
/// Overwrites any existing file of that name. The deployment name must be a
/// single path component; cluster naming rules are not checked here.
pub async fn materialize(work_dir: &Path, request: &BuildRunRequest) -> Result<PathBuf, PipelineError> {
    let path = work_dir.join(source_file_name(request));

    check_path_component(&request.deployment_name).map_err(|reason| {
        PipelineError::Materialization {
            path: path.clone(),
            source: Error::new(ErrorKind::InvalidInput, reason),
        }
    })?;

    tokio::fs::write(&path, request.code.as_bytes())
        .await
        .map_err(|source| PipelineError::Materialization {
            path: path.clone(),
            source,
        })?;

    info!("Wrote {} bytes of source to {}", request.code.len(), path.display());
    Ok(path)
}

fn check_path_component(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("deployment name must not be empty".to_string());
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(format!(
            "deployment name '{}' must be a single path component",
            name
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_java_gets_java_extension() {
        let dir = tempfile::tempdir().unwrap();
        let req = BuildRunRequest::new("JAVA", "class Main {}", "hello");

        let path = materialize(dir.path(), &req).await.unwrap();

        assert_eq!(path, dir.path().join("hello.java"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "class Main {}");
    }

    #[tokio::test]
    async fn test_other_languages_get_generic_extension() {
        let dir = tempfile::tempdir().unwrap();
        for language in ["python", "ruby", ""] {
            let req = BuildRunRequest::new(language, "print('hi')", "hello");
            let path = materialize(dir.path(), &req).await.unwrap();
            assert_eq!(path.extension().unwrap(), "py", "{language}");
        }
    }

    #[tokio::test]
    async fn test_overwrites_existing_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.py"), "old contents that are longer").unwrap();

        let code = "print('héllo')\n\tindented\n";
        let req = BuildRunRequest::new("python", code, "hello");
        let path = materialize(dir.path(), &req).await.unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), code);
    }

    #[tokio::test]
    async fn test_cluster_invalid_names_are_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let req = BuildRunRequest::new("python", "x = 1", "My_App");
        assert!(materialize(dir.path(), &req).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["../escape", "a/b", ""] {
            let req = BuildRunRequest::new("python", "x = 1", name);
            let err = materialize(dir.path(), &req).await.unwrap_err();
            assert!(matches!(err, PipelineError::Materialization { .. }), "{name}");
        }
    }

    #[tokio::test]
    async fn test_missing_work_dir_is_materialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let req = BuildRunRequest::new("python", "x = 1", "hello");

        let err = materialize(&missing, &req).await.unwrap_err();
        assert!(matches!(err, PipelineError::Materialization { .. }));
    }
}
