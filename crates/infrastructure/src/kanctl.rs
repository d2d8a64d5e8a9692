use async_trait::async_trait;
use backup_pruner_application::ports::DeletionExecutor;
use backup_pruner_domain::{DeletionTarget, DomainError};
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, warn};

/// Submits deletions through the `kanctl` command line tool.
pub struct KanctlExecutor {
    binary: PathBuf,
}

impl KanctlExecutor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn args(backup_id: &str, target: &DeletionTarget) -> Vec<String> {
        [
            "create",
            "actionset",
            "--action",
            "delete",
            "--from",
            backup_id,
            "--blueprint",
            target.blueprint.as_str(),
            "--profile",
            target.location_profile.as_str(),
            "-n",
            target.namespace.as_str(),
            "--namespacetargets",
            target.namespace.as_str(),
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
    }
}

#[async_trait]
impl DeletionExecutor for KanctlExecutor {
    /// Returns stdout followed by stderr, trimmed. A non-zero exit status is
    /// only logged; the caller decides from the output whether a job exists.
    async fn submit_deletion(
        &self,
        backup_id: &str,
        target: &DeletionTarget,
    ) -> Result<String, DomainError> {
        let args = Self::args(backup_id, target);
        debug!(binary = %self.binary.display(), args = ?args, "Running kanctl");

        let output = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::ExecutorFailed(format!(
                    "failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim().to_string();

        if !output.status.success() {
            warn!(
                backup = %backup_id,
                status = %output.status,
                output = %combined,
                "kanctl exited unsuccessfully"
            );
        }

        Ok(combined)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("kanctl");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn target() -> DeletionTarget {
        DeletionTarget {
            blueprint: "postgres-bp".to_string(),
            location_profile: "s3-profile".to_string(),
            namespace: "kanister".to_string(),
        }
    }

    #[tokio::test]
    async fn test_passes_kanctl_arguments_and_returns_output() {
        let dir = tempfile::tempdir().unwrap();
        let args_file = dir.path().join("args");
        let binary = script(
            dir.path(),
            &format!(
                "echo \"$@\" > {}\necho \"actionset delete-$6-x2f created\"",
                args_file.display()
            ),
        );

        let output = KanctlExecutor::new(binary)
            .submit_deletion("backup-abc12", &target())
            .await
            .unwrap();

        assert_eq!(output, "actionset delete-backup-abc12-x2f created");
        assert_eq!(
            std::fs::read_to_string(args_file).unwrap().trim(),
            "create actionset --action delete --from backup-abc12 --blueprint postgres-bp \
             --profile s3-profile -n kanister --namespacetargets kanister"
        );
    }

    #[tokio::test]
    async fn test_failed_exit_still_returns_output() {
        let dir = tempfile::tempdir().unwrap();
        let binary = script(dir.path(), "echo 'error: blueprint not found' >&2\nexit 1");

        let output = KanctlExecutor::new(binary)
            .submit_deletion("b1", &target())
            .await
            .unwrap();

        assert_eq!(output, "error: blueprint not found");
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_executor_failure() {
        let result = KanctlExecutor::new("/nonexistent/kanctl")
            .submit_deletion("b1", &target())
            .await;

        assert!(matches!(result, Err(DomainError::ExecutorFailed(_))));
    }
}
