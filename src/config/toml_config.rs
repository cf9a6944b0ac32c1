use crate::domain::model::{ExitPolicy, LaunchSettings};
use crate::utils::error::{LauncherError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Looked up in the base directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "launcher.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub interpreter: Option<InterpreterConfig>,
    pub environment: Option<EnvironmentConfig>,
    pub script: Option<ScriptConfig>,
    pub execution: Option<ExecutionConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterpreterConfig {
    pub name: Option<String>,
    pub search_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub path: Option<PathBuf>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub exit_status: Option<ExitPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub sample_interval_ms: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| LauncherError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LauncherError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LauncherError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Overlays every value present in the file onto `settings`.
    pub fn apply_to(&self, settings: &mut LaunchSettings) {
        if let Some(interpreter) = &self.interpreter {
            if let Some(name) = &interpreter.name {
                settings.interpreter = name.clone();
            }
            if let Some(search_path) = &interpreter.search_path {
                settings.search_path = Some(search_path.into());
            }
        }

        if let Some(dir) = self.environment.as_ref().and_then(|e| e.dir.as_ref()) {
            settings.venv_dir = dir.clone();
        }

        if let Some(script) = &self.script {
            if let Some(path) = &script.path {
                settings.script = path.clone();
            }
            if let Some(args) = &script.args {
                settings.script_args = args.clone();
            }
        }

        if let Some(policy) = self.execution.as_ref().and_then(|e| e.exit_status) {
            settings.exit_policy = policy;
        }

        if let Some(monitoring) = &self.monitoring {
            settings.monitor = monitoring.enabled;
            if let Some(ms) = monitoring.sample_interval_ms {
                settings.sample_interval = Duration::from_millis(ms);
            }
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        let mut settings = LaunchSettings::new(".");
        self.apply_to(&mut settings);
        settings.validate()
    }
}
