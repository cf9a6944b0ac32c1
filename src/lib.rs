pub mod adapters;
#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{toml_config::TomlConfig, CliConfig};

pub use adapters::{PathLocator, ProcessRunner, VenvProvisioner};
pub use crate::core::launcher::{Launcher, FINISHED_BANNER};
pub use domain::model::{ExitPolicy, LaunchReport, LaunchSettings, ProvisionOutcome};
pub use utils::error::{LauncherError, Result};
