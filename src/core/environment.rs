use crate::utils::error::{LauncherError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// A virtual environment activated for child processes.
///
/// Activation never touches the launcher's own environment: the search path
/// and `VIRTUAL_ENV` are computed once and applied to each child command via
/// [`Activation::apply`]. Dropping the value deactivates it, so release
/// happens on every exit path.
#[derive(Debug)]
pub struct Activation {
    venv_dir: PathBuf,
    search_path: OsString,
}

impl Activation {
    /// Activates `venv_dir` on top of `base_path` (the process `PATH` when `None`).
    pub fn activate(venv_dir: &Path, base_path: Option<&OsStr>) -> Result<Self> {
        let inherited = match base_path {
            Some(path) => path.to_os_string(),
            None => std::env::var_os("PATH").unwrap_or_default(),
        };

        let mut entries = vec![venv_dir.join("bin")];
        entries.extend(std::env::split_paths(&inherited));

        let search_path =
            std::env::join_paths(entries).map_err(|e| LauncherError::ConfigError {
                message: format!("Cannot build search path for {}: {}", venv_dir.display(), e),
            })?;

        tracing::debug!("Environment activated: {}", venv_dir.display());

        Ok(Self {
            venv_dir: venv_dir.to_path_buf(),
            search_path,
        })
    }

    /// Resolves `program` the way an activated shell would.
    pub fn resolve(&self, program: &str, cwd: &Path) -> Result<PathBuf> {
        which::which_in(program, Some(&self.search_path), cwd).map_err(|source| {
            LauncherError::MissingInterpreter {
                name: program.to_string(),
                source,
            }
        })
    }

    pub fn apply(&self, command: &mut Command) {
        command
            .env("PATH", &self.search_path)
            .env("VIRTUAL_ENV", &self.venv_dir)
            .env_remove("PYTHONHOME");
    }

    pub fn deactivate(self) {}
}

impl Drop for Activation {
    fn drop(&mut self) {
        tracing::debug!("Environment deactivated: {}", self.venv_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_bin_dir_is_prepended() {
        let activation =
            Activation::activate(Path::new("/srv/app/venv"), Some(OsStr::new("/usr/bin:/bin")))
                .unwrap();

        let entries: Vec<PathBuf> = std::env::split_paths(&activation.search_path).collect();
        assert_eq!(
            entries,
            vec![
                PathBuf::from("/srv/app/venv/bin"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin"),
            ]
        );
    }

    #[test]
    fn test_launcher_path_is_left_alone() {
        let before = std::env::var_os("PATH");
        let activation = Activation::activate(Path::new("/tmp/some-venv"), None).unwrap();
        assert_eq!(std::env::var_os("PATH"), before);
        activation.deactivate();
        assert_eq!(std::env::var_os("PATH"), before);
    }

    #[test]
    fn test_resolve_prefers_environment_bin() {
        let temp_dir = TempDir::new().unwrap();
        let bin = temp_dir.path().join("venv").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let python = bin.join("python");
        std::fs::write(&python, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();

        let activation = Activation::activate(
            &temp_dir.path().join("venv"),
            Some(OsStr::new("/usr/bin:/bin")),
        )
        .unwrap();

        let resolved = activation.resolve("python", temp_dir.path()).unwrap();
        assert_eq!(resolved, python);
    }

    #[test]
    fn test_resolve_reports_missing_program() {
        let temp_dir = TempDir::new().unwrap();
        let activation = Activation::activate(
            &temp_dir.path().join("venv"),
            Some(temp_dir.path().as_os_str()),
        )
        .unwrap();

        let err = activation
            .resolve("definitely-not-a-python", temp_dir.path())
            .unwrap_err();
        assert!(matches!(err, LauncherError::MissingInterpreter { .. }));
    }
}
