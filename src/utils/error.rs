use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Interpreter '{name}' not found on the search path: {source}")]
    MissingInterpreter {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("Failed to create environment at {}: {message}", .dir.display())]
    ProvisionError { dir: PathBuf, message: String },

    #[error("Failed to start '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Environment,
    Execution,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LauncherError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LauncherError::MissingInterpreter { .. } | LauncherError::ProvisionError { .. } => {
                ErrorCategory::Environment
            }
            LauncherError::SpawnError { .. } => ErrorCategory::Execution,
            LauncherError::ConfigError { .. }
            | LauncherError::ConfigValidationError { .. }
            | LauncherError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LauncherError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LauncherError::MissingInterpreter { .. }
            | LauncherError::ConfigError { .. }
            | LauncherError::ConfigValidationError { .. }
            | LauncherError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            LauncherError::ProvisionError { .. }
            | LauncherError::SpawnError { .. }
            | LauncherError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LauncherError::MissingInterpreter { name, .. } => {
                format!("{} is not installed. Please install it and try again.", name)
            }
            LauncherError::ProvisionError { dir, .. } => {
                format!("Could not create the virtual environment in {}", dir.display())
            }
            LauncherError::SpawnError { program, .. } => {
                format!("Could not start {}", program)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LauncherError::MissingInterpreter { .. } => {
                "Install the interpreter or pass --interpreter with a name available on PATH"
                    .to_string()
            }
            LauncherError::ProvisionError { .. } => {
                "Check that the venv module is installed (e.g. python3-venv) and the directory is writable"
                    .to_string()
            }
            LauncherError::SpawnError { .. } => {
                "Remove the environment directory so it is recreated on the next run".to_string()
            }
            LauncherError::ConfigError { .. }
            | LauncherError::ConfigValidationError { .. }
            | LauncherError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command-line flags".to_string()
            }
            LauncherError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_interpreter_exits_with_one() {
        let err = LauncherError::MissingInterpreter {
            name: "python3".to_string(),
            source: which::Error::CannotFindBinaryPath,
        };
        assert_eq!(err.category(), ErrorCategory::Environment);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("python3 is not installed"));
    }

    #[test]
    fn test_provision_error_is_critical() {
        let err = LauncherError::ProvisionError {
            dir: PathBuf::from("venv"),
            message: "No space left on device".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("No space left on device"));
    }
}
