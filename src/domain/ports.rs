use crate::core::environment::Activation;
use crate::domain::model::RunOutcome;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Resolves executables on a search path.
pub trait InterpreterLocator: Send + Sync {
    fn locate(&self, name: &str) -> Result<PathBuf>;
}

/// Creates an isolated environment rooted at a directory.
#[async_trait]
pub trait EnvironmentProvisioner: Send + Sync {
    async fn create(&self, interpreter: &Path, dir: &Path) -> Result<()>;
}

/// A single delegated invocation.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: &'a Path,
    pub activation: &'a Activation,
}

/// Runs the delegated program to completion and times it.
#[async_trait]
pub trait ProgramRunner: Send + Sync {
    async fn run(&self, invocation: Invocation<'_>) -> Result<RunOutcome>;
}
