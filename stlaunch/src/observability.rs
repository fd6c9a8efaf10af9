//! Observability: tracing init and the JSONL audit log of bootstrap events.
//!
//! Reads `ObservabilityConfig` for STLAUNCH_QUIET, STLAUNCH_LOG_LEVEL, STLAUNCH_LOG_JSON
//! and STLAUNCH_AUDIT_LOG. Diagnostics go to stderr; stdout belongs to the runner.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use stlaunch_core::config::ObservabilityConfig;
use stlaunch_venv::{BootstrapEvent, DependencySource, Invocation};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize tracing. Call once, after `.env` has been loaded.
/// `RUST_LOG` wins over STLAUNCH_LOG_LEVEL; STLAUNCH_QUIET=1 keeps only WARN and above.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "stlaunch=warn".to_string()
    } else {
        cfg.log_level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .try_init()
    };
}

fn audit_path() -> Option<&'static str> {
    let path = ObservabilityConfig::from_env().audit_log.as_deref()?;
    if let Some(parent) = Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    Some(path)
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// JSON record for one bootstrap event.
pub fn event_record(event: &BootstrapEvent, ts: &str) -> serde_json::Value {
    let mut record = json!({
        "ts": ts,
        "event": event.name(),
    });
    match event {
        BootstrapEvent::EnvActivated { venv } => {
            record["venv"] = json!(venv.display().to_string());
        }
        BootstrapEvent::EnvCreated { venv, python } => {
            record["venv"] = json!(venv.display().to_string());
            record["python"] = json!(python.display().to_string());
        }
        BootstrapEvent::InstallerUpgraded => {}
        BootstrapEvent::DepsInstalled { source } => {
            record["source"] = json!(source.kind());
            record["packages"] = match source {
                DependencySource::Manifest(path) => json!(path.display().to_string()),
                DependencySource::Fallback(packages) => json!(packages),
            };
        }
    }
    record
}

/// JSON record for the runner handoff.
pub fn launch_record(launch: &Invocation, ts: &str) -> serde_json::Value {
    json!({
        "ts": ts,
        "event": "launch",
        "cmd": launch.program.display().to_string(),
        "args": launch.args_lossy(),
        "cwd": launch.cwd.display().to_string(),
    })
}

/// Audit: every event the bootstrap procedure produced.
pub fn audit_events(events: &[BootstrapEvent]) {
    if let Some(path) = audit_path() {
        let ts = now();
        for event in events {
            append_jsonl(path, &event_record(event, &ts));
        }
    }
}

/// Audit: runner handoff, written right before exec.
pub fn audit_launch(launch: &Invocation) {
    if let Some(path) = audit_path() {
        append_jsonl(path, &launch_record(launch, &now()));
    }
}
