use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_VENV_DIR: &str = "venv";
pub const DEFAULT_SCRIPT: &str = "log_analyzer.py";
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 250;

/// Exit code recorded when the delegated program could not be found or started.
pub const NOT_STARTED_EXIT_CODE: i32 = 127;

/// What the launcher does with the delegated program's exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Always exit 0 once the delegated program has run.
    #[default]
    Mask,
    /// Exit with the delegated program's own code.
    Propagate,
}

/// Fully resolved launcher settings.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub interpreter: String,
    /// Search path for the interpreter check; `None` means the process `PATH`.
    pub search_path: Option<OsString>,
    /// Anchor for the environment directory and the script. Defaults to the
    /// working directory, not the launcher binary's location.
    pub base_dir: PathBuf,
    pub venv_dir: PathBuf,
    pub script: PathBuf,
    pub script_args: Vec<String>,
    pub exit_policy: ExitPolicy,
    pub monitor: bool,
    pub sample_interval: Duration,
}

impl LaunchSettings {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            search_path: None,
            base_dir: base_dir.into(),
            venv_dir: PathBuf::from(DEFAULT_VENV_DIR),
            script: PathBuf::from(DEFAULT_SCRIPT),
            script_args: Vec::new(),
            exit_policy: ExitPolicy::default(),
            monitor: false,
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
        }
    }

    /// Environment directory, anchored at the base directory when relative.
    pub fn venv_path(&self) -> PathBuf {
        self.base_dir.join(&self.venv_dir)
    }

    pub fn script_path(&self) -> PathBuf {
        self.base_dir.join(&self.script)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionOutcome {
    Created,
    AlreadyPresent,
    /// Creation failed and the launch carried on without it.
    Failed,
}

/// How the delegated program ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgramExit {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ProgramExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Shell-style exit code: the code itself, or 128 + signal.
    pub fn shell_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => 1,
        }
    }
}

impl From<std::process::ExitStatus> for ProgramExit {
    fn from(status: std::process::ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;
        Self {
            code: status.code(),
            signal: status.signal(),
        }
    }
}

/// Elapsed wall-clock and CPU time of the delegated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimingReport {
    pub real: Duration,
    pub user: Duration,
    pub sys: Duration,
}

fn write_shell_duration(f: &mut fmt::Formatter<'_>, label: &str, d: Duration) -> fmt::Result {
    let millis = d.as_millis();
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1000;
    let rest = millis % 1000;
    write!(f, "{}\t{}m{}.{:03}s", label, minutes, seconds, rest)
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_shell_duration(f, "real", self.real)?;
        writeln!(f)?;
        write_shell_duration(f, "user", self.user)?;
        writeln!(f)?;
        write_shell_duration(f, "sys", self.sys)
    }
}

/// Resource figures sampled from the delegated program while it ran.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResourceStats {
    pub samples: u32,
    pub peak_memory_mb: u64,
    pub last_cpu_usage: f32,
}

/// Result of one delegated invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutcome {
    pub exit: ProgramExit,
    pub timing: TimingReport,
    pub stats: Option<ResourceStats>,
}

impl RunOutcome {
    /// A delegated run that never started, reported the way a shell would.
    pub fn not_started() -> Self {
        Self {
            exit: ProgramExit {
                code: Some(NOT_STARTED_EXIT_CODE),
                signal: None,
            },
            timing: TimingReport::default(),
            stats: None,
        }
    }
}

/// Everything a launch observed.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    pub started_at: DateTime<Utc>,
    pub interpreter: PathBuf,
    pub venv_dir: PathBuf,
    pub provision: ProvisionOutcome,
    pub exit: ProgramExit,
    pub timing: TimingReport,
    pub stats: Option<ResourceStats>,
    pub exit_policy: ExitPolicy,
}

impl LaunchReport {
    /// Exit code the launcher itself should return.
    pub fn launcher_exit_code(&self) -> i32 {
        match self.exit_policy {
            ExitPolicy::Mask => 0,
            ExitPolicy::Propagate => self.exit.shell_code(),
        }
    }

    /// Writes the report as pretty JSON to `path`.
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self).map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}
