use crate::domain::ports::EnvironmentProvisioner;
use crate::utils::error::{LauncherError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Creates environments with `<interpreter> -m venv <dir>`.
///
/// The creator's stdout and stderr go to the terminal unchanged.
#[derive(Debug, Clone, Default)]
pub struct VenvProvisioner;

impl VenvProvisioner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EnvironmentProvisioner for VenvProvisioner {
    async fn create(&self, interpreter: &Path, dir: &Path) -> Result<()> {
        tracing::info!("Creating a new virtual environment in {}", dir.display());

        let status = Command::new(interpreter)
            .arg("-m")
            .arg("venv")
            .arg(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| LauncherError::SpawnError {
                program: interpreter.display().to_string(),
                source,
            })?;

        if status.success() {
            tracing::info!("Virtual environment created successfully");
            Ok(())
        } else {
            Err(LauncherError::ProvisionError {
                dir: dir.to_path_buf(),
                message: format!("{} -m venv {}", interpreter.display(), status),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_script(path: &Path, body: &str) {
        std::fs::write(path, body).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[tokio::test]
    async fn test_create_passes_venv_arguments() {
        let temp_dir = TempDir::new().unwrap();
        let interpreter = temp_dir.path().join("python3");
        write_script(
            &interpreter,
            "#!/bin/sh\n[ \"$1\" = \"-m\" ] && [ \"$2\" = \"venv\" ] && /bin/mkdir -p \"$3/bin\"\n",
        );

        let dir = temp_dir.path().join("venv");
        VenvProvisioner::new().create(&interpreter, &dir).await.unwrap();
        assert!(dir.join("bin").is_dir());
    }

    #[tokio::test]
    async fn test_failed_creation_reports_exit_status() {
        let temp_dir = TempDir::new().unwrap();
        let interpreter = temp_dir.path().join("python3");
        write_script(
            &interpreter,
            "#!/bin/sh\necho 'No module named venv' >&2\nexit 1\n",
        );

        let err = VenvProvisioner::new()
            .create(&interpreter, &temp_dir.path().join("venv"))
            .await
            .unwrap_err();
        match err {
            LauncherError::ProvisionError { message, .. } => {
                assert!(message.contains("-m venv"));
                assert!(message.contains("exit status: 1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
