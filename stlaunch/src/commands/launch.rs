//! `stlaunch launch` and `stlaunch setup`.

use std::ffi::OsString;
use std::path::Path;

use anyhow::Result;
use stlaunch_core::config::LaunchConfig;
use stlaunch_venv::{info_log, Bootstrapper, PreparedLaunch, SystemRunner};

use crate::observability;

fn prepare(app_dir: &Path, config: &LaunchConfig, extra: &[OsString]) -> Result<PreparedLaunch> {
    let prepared = Bootstrapper::new(app_dir, config, &SystemRunner)
        .with_extra_args(extra.iter().cloned())
        .prepare()?;
    observability::audit_events(&prepared.events);
    Ok(prepared)
}

/// Bootstrap, then hand the process over to the runner. Returns the runner's exit
/// code where the platform cannot replace the process image.
pub fn cmd_launch(app_dir: &Path, config: &LaunchConfig, extra: &[OsString]) -> Result<i32> {
    let prepared = prepare(app_dir, config, extra)?;
    let entry = app_dir.join(&config.entry);
    if !entry.is_file() {
        tracing::warn!(entry = %entry.display(), "entry point not found; the runner will report it");
    }
    info_log!("Launching: {}", prepared.launch.command_line());
    observability::audit_launch(&prepared.launch);
    Ok(prepared.handoff(&SystemRunner)?)
}

/// Bootstrap without launching.
pub fn cmd_setup(app_dir: &Path, config: &LaunchConfig) -> Result<i32> {
    let prepared = prepare(app_dir, config, &[])?;
    let venv = app_dir.join(&config.venv_dir);
    if prepared.provisioned {
        eprintln!("✓ Environment provisioned at {}", venv.display());
    } else if prepared.activated.is_active() {
        eprintln!("✓ Environment at {} is ready", venv.display());
    } else {
        eprintln!(
            "✓ '{}' is available outside {}; nothing to do",
            config.runner,
            venv.display()
        );
    }
    eprintln!("  Launch with: {}", prepared.launch.command_line());
    Ok(0)
}
