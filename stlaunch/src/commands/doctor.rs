//! `stlaunch doctor`: read-only report of what a launch would do.

use std::path::Path;

use anyhow::Result;
use serde_json::json;
use stlaunch_core::config::LaunchConfig;
use stlaunch_venv::{Bootstrapper, Inspection, Readiness, SystemRunner};

pub fn inspection_json(inspection: &Inspection) -> serde_json::Value {
    let (ready, detail) = match inspection.readiness {
        Readiness::Ready { ref runner } => (true, runner.display().to_string()),
        Readiness::NotReady { ref reason } => (false, reason.clone()),
    };
    json!({
        "app_dir": inspection.app_dir.display().to_string(),
        "venv": {
            "path": inspection.layout.root().display().to_string(),
            "exists": inspection.venv_exists,
            "interpreter": inspection.layout.has_interpreter()
                .then(|| inspection.layout.interpreter().display().to_string()),
            "activated": inspection.activated.is_active(),
        },
        "readiness": {
            "mode": inspection.readiness_mode.to_string(),
            "ready": ready,
            "detail": detail,
        },
        "dependencies": {
            "source": inspection.source.kind(),
            "spec": inspection.source.to_string(),
        },
        "entry": {
            "path": inspection.entry.display().to_string(),
            "exists": inspection.entry_exists,
        },
        "launch": {
            "cmd": inspection.launch.program.display().to_string(),
            "args": inspection.launch.args_lossy(),
        },
    })
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

pub fn cmd_doctor(app_dir: &Path, config: &LaunchConfig, as_json: bool) -> Result<i32> {
    let inspection = Bootstrapper::new(app_dir, config, &SystemRunner).inspect()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&inspection_json(&inspection))?);
        return Ok(0);
    }

    println!("App directory: {}", inspection.app_dir.display());
    println!(
        "  {} environment  {}",
        mark(inspection.venv_exists),
        inspection.layout.root().display()
    );
    match inspection.readiness {
        Readiness::Ready { ref runner } => println!(
            "  {} ready ({})     {}",
            mark(true),
            inspection.readiness_mode,
            runner.display()
        ),
        Readiness::NotReady { ref reason } => println!(
            "  {} ready ({})     {} (next launch provisions the environment)",
            mark(false),
            inspection.readiness_mode,
            reason
        ),
    }
    println!(
        "  • dependencies   {} ({})",
        inspection.source,
        inspection.source.kind()
    );
    println!(
        "  {} entry point    {}",
        mark(inspection.entry_exists),
        inspection.entry.display()
    );
    println!("  • launch         {}", inspection.launch.command_line());
    Ok(0)
}
