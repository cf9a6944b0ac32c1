use crate::core::environment::Activation;
use crate::domain::model::{
    ExitPolicy, LaunchReport, LaunchSettings, ProvisionOutcome, RunOutcome,
};
use crate::domain::ports::{EnvironmentProvisioner, InterpreterLocator, Invocation, ProgramRunner};
use crate::utils::error::{LauncherError, Result};
use crate::utils::monitor;
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const FINISHED_BANNER: &str = "Script finished. Environment deactivated.";

/// Name the delegated program is resolved under inside an activated environment.
const ENV_PYTHON: &str = "python";

/// Check, provision, activate, run, deactivate, report.
pub struct Launcher<L, P, R, W> {
    settings: LaunchSettings,
    locator: L,
    provisioner: P,
    runner: R,
    out: W,
}

impl<L, P, R, W> Launcher<L, P, R, W>
where
    L: InterpreterLocator,
    P: EnvironmentProvisioner,
    R: ProgramRunner,
    W: Write + Send,
{
    pub fn new(settings: LaunchSettings, locator: L, provisioner: P, runner: R, out: W) -> Self {
        Self {
            settings,
            locator,
            provisioner,
            runner,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn check_interpreter(&self) -> Result<PathBuf> {
        let interpreter = self.locator.locate(&self.settings.interpreter)?;
        tracing::debug!("Using interpreter {}", interpreter.display());
        Ok(interpreter)
    }

    /// Creates the environment unless its directory already exists.
    ///
    /// The creator's own output goes straight to the terminal. Whether a
    /// failure stops the launch is decided by [`Launcher::run`].
    pub async fn provision(&mut self, interpreter: &Path) -> Result<ProvisionOutcome> {
        let venv = self.settings.venv_path();
        if venv.exists() {
            tracing::debug!("Environment already present at {}", venv.display());
            return Ok(ProvisionOutcome::AlreadyPresent);
        }

        writeln!(self.out, "Creating virtual environment...")?;
        self.out.flush()?;
        self.provisioner.create(interpreter, &venv).await?;
        Ok(ProvisionOutcome::Created)
    }

    fn install_dependencies(&self) {
        tracing::debug!("No dependencies declared; skipping installation");
    }

    /// Runs the script. Failing to find or start `python` counts as a failed
    /// run of the delegated program, not as a launcher error.
    async fn invoke(&mut self, activation: &Activation) -> Result<RunOutcome> {
        writeln!(self.out, "Running {}...", self.settings.script.display())?;
        self.out.flush()?;

        let program = match activation.resolve(ENV_PYTHON, &self.settings.base_dir) {
            Ok(program) => program,
            Err(e) => {
                tracing::error!("❌ {}", e);
                return Ok(RunOutcome::not_started());
            }
        };

        let mut args = vec![self.settings.script_path().to_string_lossy().into_owned()];
        args.extend(self.settings.script_args.iter().cloned());

        let result = self
            .runner
            .run(Invocation {
                program,
                args,
                working_dir: &self.settings.base_dir,
                activation,
            })
            .await;

        match result {
            Err(e @ LauncherError::SpawnError { .. }) => {
                tracing::error!("❌ {}", e);
                Ok(RunOutcome::not_started())
            }
            other => other,
        }
    }

    pub async fn run(&mut self) -> Result<LaunchReport> {
        let started_at = Utc::now();
        tracing::info!("🚀 Starting launcher for {}", self.settings.script.display());

        let interpreter = self.check_interpreter()?;
        let provision = match self.provision(&interpreter).await {
            Err(e @ (LauncherError::ProvisionError { .. } | LauncherError::SpawnError { .. }))
                if self.settings.exit_policy == ExitPolicy::Mask =>
            {
                tracing::error!("❌ {}", e);
                ProvisionOutcome::Failed
            }
            other => other?,
        };
        self.install_dependencies();

        writeln!(self.out, "Activating virtual environment...")?;
        let activation = Activation::activate(
            &self.settings.venv_path(),
            self.settings.search_path.as_deref(),
        )?;
        let outcome = self.invoke(&activation).await;
        activation.deactivate();
        let outcome = outcome?;

        writeln!(self.out)?;
        writeln!(self.out, "{}", outcome.timing)?;
        if let Some(stats) = &outcome.stats {
            monitor::log_final_stats(stats);
            writeln!(
                self.out,
                "peak\t{}MB ({} samples)",
                stats.peak_memory_mb, stats.samples
            )?;
        }
        writeln!(self.out, "{}", FINISHED_BANNER)?;
        self.out.flush()?;

        tracing::info!(
            "✅ Delegated program finished with status {} in {:?}",
            outcome.exit.shell_code(),
            outcome.timing.real
        );

        Ok(LaunchReport {
            started_at,
            interpreter,
            venv_dir: self.settings.venv_path(),
            provision,
            exit: outcome.exit,
            timing: outcome.timing,
            stats: outcome.stats,
            exit_policy: self.settings.exit_policy,
        })
    }

    /// Reports what [`Launcher::run`] would do without creating or running anything.
    pub fn dry_run(&mut self) -> Result<()> {
        let interpreter = self.check_interpreter()?;
        let venv = self.settings.venv_path();

        writeln!(self.out, "Interpreter: {}", interpreter.display())?;
        if venv.exists() {
            writeln!(self.out, "Environment: {} (present)", venv.display())?;
        } else {
            writeln!(self.out, "Environment: {} (would be created)", venv.display())?;
        }

        let mut command = vec![
            venv.join("bin").join(ENV_PYTHON).display().to_string(),
            self.settings.script_path().display().to_string(),
        ];
        command.extend(self.settings.script_args.iter().cloned());
        writeln!(self.out, "Command: {}", command.join(" "))?;
        writeln!(self.out, "Working directory: {}", self.settings.base_dir.display())?;
        Ok(())
    }
}
