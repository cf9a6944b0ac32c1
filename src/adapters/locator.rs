use crate::domain::ports::InterpreterLocator;
use crate::utils::error::{LauncherError, Result};
use std::ffi::OsString;
use std::path::PathBuf;

/// Looks executables up on `PATH`, or on an explicit search path.
#[derive(Debug, Clone, Default)]
pub struct PathLocator {
    search_path: Option<OsString>,
    cwd: Option<PathBuf>,
}

impl PathLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_path(search_path: impl Into<OsString>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            search_path: Some(search_path.into()),
            cwd: Some(cwd.into()),
        }
    }
}

impl InterpreterLocator for PathLocator {
    fn locate(&self, name: &str) -> Result<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = match &self.cwd {
                    Some(cwd) => cwd.clone(),
                    None => std::env::current_dir()?,
                };
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };

        found.map_err(|source| LauncherError::MissingInterpreter {
            name: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_locate_on_explicit_search_path() {
        let temp_dir = TempDir::new().unwrap();
        let program = temp_dir.path().join("fake-python");
        std::fs::write(&program, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let locator = PathLocator::with_search_path(temp_dir.path(), temp_dir.path());
        assert_eq!(locator.locate("fake-python").unwrap(), program);
    }

    #[test]
    fn test_non_executable_file_is_not_an_interpreter() {
        let temp_dir = TempDir::new().unwrap();
        let program = temp_dir.path().join("fake-python");
        std::fs::write(&program, "not executable").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o644)).unwrap();

        let locator = PathLocator::with_search_path(temp_dir.path(), temp_dir.path());
        let err = locator.locate("fake-python").unwrap_err();
        assert!(matches!(err, LauncherError::MissingInterpreter { ref name, .. } if name == "fake-python"));
    }
}
