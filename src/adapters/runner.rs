use crate::core::timing::Stopwatch;
use crate::domain::model::{ProgramExit, RunOutcome};
use crate::domain::ports::{Invocation, ProgramRunner};
use crate::utils::error::{LauncherError, Result};
use crate::utils::monitor::ProcessMonitor;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Lower bound for the sampling interval; `tokio::time::interval` panics on zero.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns the delegated program with inherited stdio and waits for it.
///
/// No timeout: a hung program hangs the launcher.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    monitor: bool,
    sample_interval: Duration,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            monitor: false,
            sample_interval: Duration::from_millis(250),
        }
    }

    pub fn new_with_monitoring(monitor: bool, sample_interval: Duration) -> Self {
        Self {
            monitor,
            sample_interval: sample_interval.max(MIN_SAMPLE_INTERVAL),
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgramRunner for ProcessRunner {
    async fn run(&self, invocation: Invocation<'_>) -> Result<RunOutcome> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(invocation.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        invocation.activation.apply(&mut command);

        tracing::debug!(
            "Spawning {} {:?} in {}",
            invocation.program.display(),
            invocation.args,
            invocation.working_dir.display()
        );

        let stopwatch = Stopwatch::start();
        let mut child = command.spawn().map_err(|source| LauncherError::SpawnError {
            program: invocation.program.display().to_string(),
            source,
        })?;

        let mut monitor = match (self.monitor, child.id()) {
            (true, Some(pid)) => Some(ProcessMonitor::new(pid)),
            _ => None,
        };

        let status = match monitor.as_mut() {
            Some(monitor) => {
                let mut ticker = tokio::time::interval(self.sample_interval);
                loop {
                    tokio::select! {
                        status = child.wait() => break status?,
                        _ = ticker.tick() => {
                            monitor.sample();
                        }
                    }
                }
            }
            None => child.wait().await?,
        };

        let timing = stopwatch.stop();
        let exit = ProgramExit::from(status);
        if !exit.success() {
            tracing::warn!(
                "Delegated program exited with status {}",
                exit.shell_code()
            );
        }

        Ok(RunOutcome {
            exit,
            timing,
            stats: monitor.map(|m| m.stats()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::Activation;
    use std::ffi::OsStr;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_reports_exit_code_and_timing() {
        let temp_dir = TempDir::new().unwrap();
        let activation =
            Activation::activate(&temp_dir.path().join("venv"), Some(OsStr::new("/usr/bin:/bin")))
                .unwrap();

        let outcome = ProcessRunner::new()
            .run(Invocation {
                program: PathBuf::from("/bin/sh"),
                args: vec!["-c".to_string(), "sleep 0.05; exit 4".to_string()],
                working_dir: temp_dir.path(),
                activation: &activation,
            })
            .await
            .unwrap();

        assert_eq!(outcome.exit.code, Some(4));
        assert!(outcome.timing.real >= Duration::from_millis(50));
        assert!(outcome.stats.is_none());
    }

    #[tokio::test]
    async fn test_child_sees_activation() {
        let temp_dir = TempDir::new().unwrap();
        let venv = temp_dir.path().join("venv");
        let activation =
            Activation::activate(&venv, Some(OsStr::new("/usr/bin:/bin"))).unwrap();

        let script = format!(
            "[ \"$VIRTUAL_ENV\" = \"{}\" ] && case \"$PATH\" in \"{}/bin:\"*) exit 0;; esac; exit 1",
            venv.display(),
            venv.display()
        );
        let outcome = ProcessRunner::new()
            .run(Invocation {
                program: PathBuf::from("/bin/sh"),
                args: vec!["-c".to_string(), script],
                working_dir: temp_dir.path(),
                activation: &activation,
            })
            .await
            .unwrap();

        assert!(outcome.exit.success());
    }

    #[cfg(feature = "cli")]
    #[tokio::test]
    async fn test_monitoring_collects_samples() {
        let temp_dir = TempDir::new().unwrap();
        let activation =
            Activation::activate(&temp_dir.path().join("venv"), Some(OsStr::new("/usr/bin:/bin")))
                .unwrap();

        let outcome = ProcessRunner::new_with_monitoring(true, Duration::from_millis(20))
            .run(Invocation {
                program: PathBuf::from("/bin/sh"),
                args: vec!["-c".to_string(), "sleep 0.2".to_string()],
                working_dir: temp_dir.path(),
                activation: &activation,
            })
            .await
            .unwrap();

        let stats = outcome.stats.expect("monitoring was enabled");
        assert!(stats.samples >= 1);
    }

    #[tokio::test]
    async fn test_missing_program_is_a_spawn_error() {
        let temp_dir = TempDir::new().unwrap();
        let activation =
            Activation::activate(&temp_dir.path().join("venv"), Some(OsStr::new("/usr/bin:/bin")))
                .unwrap();

        let err = ProcessRunner::new()
            .run(Invocation {
                program: temp_dir.path().join("venv/bin/python"),
                args: vec![],
                working_dir: temp_dir.path(),
                activation: &activation,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::SpawnError { .. }));
    }

    #[tokio::test]
    async fn test_zero_sample_interval_is_clamped() {
        let runner = ProcessRunner::new_with_monitoring(true, Duration::ZERO);
        assert_eq!(runner.sample_interval, MIN_SAMPLE_INTERVAL);

        let temp_dir = TempDir::new().unwrap();
        let activation =
            Activation::activate(&temp_dir.path().join("venv"), Some(OsStr::new("/usr/bin:/bin")))
                .unwrap();

        let outcome = runner
            .run(Invocation {
                program: PathBuf::from("/bin/sh"),
                args: vec!["-c".to_string(), "exit 0".to_string()],
                working_dir: temp_dir.path(),
                activation: &activation,
            })
            .await
            .unwrap();
        assert!(outcome.exit.success());
    }
}
