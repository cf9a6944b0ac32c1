use analyzer_launcher::utils::logger;
use analyzer_launcher::{
    CliConfig, Launcher, LauncherError, PathLocator, ProcessRunner, VenvProvisioner,
};
use anyhow::Context;
use clap::Parser;

fn fail(e: &LauncherError) -> ! {
    tracing::error!(
        "❌ Launch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    let settings = match config.resolve(&cwd) {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    if settings.monitor {
        tracing::info!("🔍 Process monitoring enabled");
    }

    let locator = match &settings.search_path {
        Some(search_path) => PathLocator::with_search_path(search_path.clone(), &settings.base_dir),
        None => PathLocator::new(),
    };
    let runner = ProcessRunner::new_with_monitoring(settings.monitor, settings.sample_interval);
    let mut launcher = Launcher::new(
        settings,
        locator,
        VenvProvisioner::new(),
        runner,
        std::io::stdout(),
    );

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be created or run");
        if let Err(e) = launcher.dry_run() {
            fail(&e);
        }
        return Ok(());
    }

    match launcher.run().await {
        Ok(report) => {
            if let Some(path) = &config.report {
                let path = cwd.join(path);
                report
                    .write_json(&path)
                    .with_context(|| format!("cannot write the run report to {}", path.display()))?;
                tracing::info!("📁 Run report saved to: {}", path.display());
            }

            let exit_code = report.launcher_exit_code();
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
