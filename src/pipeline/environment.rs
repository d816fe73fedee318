//! Environment initialization stage

use super::context::SessionContext;
use crate::engine::{EngineLauncher, fetch_script};
use crate::error::{Error, Result};
use crate::types::{EnvironmentStep, Stage};
use tracing::{debug, info};

fn step_failed(step: EnvironmentStep) -> impl FnOnce(Error) -> Error {
    move |e| Error::Environment {
        step,
        reason: e.to_string(),
    }
}

/// Acquire a fresh engine for the session
///
/// Milestones: 10 on entry, 30 after boot, 60 after the capability packages,
/// 90 after the auxiliary packages, 100 once the script is loaded.
pub(crate) async fn run_environment_stage(
    ctx: &mut SessionContext,
    launcher: &dyn EngineLauncher,
) -> Result<()> {
    let engine_config = &ctx.config.engine;
    info!(session = %ctx.id, launcher = launcher.name(), "initializing processing environment");
    ctx.reporter.report(Stage::EnvironmentInit, 10);

    let mut runtime = launcher
        .boot()
        .await
        .map_err(step_failed(EnvironmentStep::Boot))?;
    ctx.reporter.report(Stage::EnvironmentInit, 30);

    debug!(session = %ctx.id, packages = ?engine_config.packages, "loading packages");
    runtime
        .load_packages(&engine_config.packages)
        .await
        .map_err(step_failed(EnvironmentStep::LoadPackages))?;
    ctx.reporter.report(Stage::EnvironmentInit, 60);

    debug!(session = %ctx.id, packages = ?engine_config.auxiliary_packages, "installing auxiliary packages");
    runtime
        .install_packages(&engine_config.auxiliary_packages)
        .await
        .map_err(step_failed(EnvironmentStep::InstallPackages))?;
    ctx.reporter.report(Stage::EnvironmentInit, 90);

    debug!(session = %ctx.id, script = %engine_config.script, "loading processing script");
    let script = fetch_script(&engine_config.script)
        .await
        .map_err(step_failed(EnvironmentStep::LoadScript))?;
    runtime
        .load_script(&script)
        .await
        .map_err(step_failed(EnvironmentStep::LoadScript))?;
    let engine = runtime
        .into_engine()
        .map_err(step_failed(EnvironmentStep::LoadScript))?;

    ctx.engine = Some(engine);
    ctx.reporter.report(Stage::EnvironmentInit, 100);
    ctx.reporter.complete_stage();
    info!(session = %ctx.id, "processing environment ready");

    Ok(())
}
