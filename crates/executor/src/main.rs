//! `onstart-executor` -- runs startup scripts once on process activation.
//!
//! Discovers scripts under `SCRIPT_ROOT` whose header marks them
//! `execution-mode: on-start`, skips those scoped to inactive run modes via a
//! `config.<mode>/` folder, then validates and runs the rest with `bash`.
//! See [`ExecutorConfig::from_env`] for the environment variables read.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use onstart_core::run_mode::StaticRunModes;
use onstart_executor::config::{ExecutorConfig, LogFormat};
use onstart_executor::StartupExecutor;
use onstart_local::{DirectorySessionFactory, HeaderScriptFinder, ShellScriptManager};

/// Environment variable exposing the active run modes to scripts.
const ENV_RUN_MODES: &str = "ONSTART_RUN_MODES";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ExecutorConfig::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        script_root = %config.script_root.display(),
        run_modes = %config.run_modes,
        "Loaded executor configuration",
    );

    let manager = ShellScriptManager::new()
        .context("failed to build subprocess runtime")?
        .with_working_directory(&config.script_root)
        .with_env(ENV_RUN_MODES, config.run_modes.to_string())
        .with_timeouts(config.validation_timeout, config.script_timeout);

    let sessions = DirectorySessionFactory::new(&config.script_root)
        .with_extension(config.script_extension.clone());

    let executor = StartupExecutor::new(
        Arc::new(HeaderScriptFinder),
        Arc::new(manager),
        Arc::new(StaticRunModes::new(config.run_modes.clone())),
        Arc::new(sessions),
    );

    let report = executor.run_pass();

    tracing::info!(
        pass_id = %report.pass_id,
        completed = report.completed,
        discovered = report.discovered,
        denied = report.denied.len(),
        succeeded = report.succeeded_count(),
        unsuccessful = report.unsuccessful_count(),
        "Startup pass finished",
    );

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "onstart_executor=info,onstart_local=info,onstart_core=info".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}
