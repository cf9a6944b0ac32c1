pub mod toml_config;

use crate::domain::model::{ExitPolicy, LaunchSettings};
use crate::utils::error::{LauncherError, Result};
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml_config::{TomlConfig, DEFAULT_CONFIG_FILE};

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "analyzer-launcher")]
#[command(about = "Provision a Python virtual environment and run the log analyzer inside it")]
pub struct CliConfig {
    /// TOML configuration file (defaults to launcher.toml in the base directory, if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Interpreter that must be installed and creates the environment
    #[arg(long)]
    pub interpreter: Option<String>,

    /// Search path for the interpreter check, instead of PATH
    #[arg(long)]
    pub search_path: Option<String>,

    /// Directory holding the environment and the script
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Environment directory, relative to the base directory
    #[arg(long)]
    pub venv_dir: Option<PathBuf>,

    /// Script to run, relative to the base directory
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Exit with the script's exit code instead of 0
    #[arg(long)]
    pub propagate_exit_status: bool,

    /// Sample the script's CPU and memory while it runs
    #[arg(long)]
    pub monitor: bool,

    #[arg(long)]
    pub sample_interval_ms: Option<u64>,

    /// Show what would be provisioned and run, without doing it
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run report as JSON to this file; stdout is left untouched
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Emit logs (stderr) as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Arguments forwarded to the script
    #[arg(last = true)]
    pub script_args: Vec<String>,
}

impl CliConfig {
    /// Flags win over the config file, which wins over defaults.
    pub fn resolve(&self, cwd: &Path) -> Result<LaunchSettings> {
        let base_dir = match &self.base_dir {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        };
        let mut settings = LaunchSettings::new(base_dir);

        let config_path = match &self.config {
            Some(path) => Some(cwd.join(path)),
            None => {
                let default_path = settings.base_dir.join(DEFAULT_CONFIG_FILE);
                default_path.is_file().then_some(default_path)
            }
        };
        if let Some(path) = &config_path {
            tracing::debug!("Loading configuration from {}", path.display());
            let file = TomlConfig::from_file(path)?;
            file.validate().map_err(|e| LauncherError::ConfigError {
                message: format!("{}: {}", path.display(), e),
            })?;
            file.apply_to(&mut settings);
        }

        self.apply_to(&mut settings);
        settings.validate()?;
        Ok(settings)
    }

    fn apply_to(&self, settings: &mut LaunchSettings) {
        if let Some(interpreter) = &self.interpreter {
            settings.interpreter = interpreter.clone();
        }
        if let Some(search_path) = &self.search_path {
            settings.search_path = Some(search_path.into());
        }
        if let Some(venv_dir) = &self.venv_dir {
            settings.venv_dir = venv_dir.clone();
        }
        if let Some(script) = &self.script {
            settings.script = script.clone();
        }
        if !self.script_args.is_empty() {
            settings.script_args = self.script_args.clone();
        }
        if self.propagate_exit_status {
            settings.exit_policy = ExitPolicy::Propagate;
        }
        if self.monitor {
            settings.monitor = true;
        }
        if let Some(ms) = self.sample_interval_ms {
            settings.sample_interval = Duration::from_millis(ms);
        }
    }
}
