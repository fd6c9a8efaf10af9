//! Application directory resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stlaunch_core::config::{env_keys, parse_dotenv};

/// Pick the directory the launcher works in.
///
/// Order: explicit flag, `STLAUNCH_APP_DIR`, the directory of the launcher executable
/// when it also holds the entry point, then the current directory. Without a flag or
/// env entry, the entry name comes from the executable directory's own `.env`.
pub fn resolve_app_dir(
    explicit: Option<&Path>,
    from_env: Option<&str>,
    exe: Option<&Path>,
    entry: Option<&str>,
    cwd: &Path,
) -> PathBuf {
    if let Some(dir) = explicit {
        return cwd.join(dir);
    }
    if let Some(dir) = from_env.map(str::trim).filter(|s| !s.is_empty()) {
        return cwd.join(dir);
    }
    if let Some(exe_dir) = exe.and_then(Path::parent) {
        let entry = match entry {
            Some(entry) => entry.to_string(),
            None => dotenv_entry(exe_dir)
                .unwrap_or_else(|| env_keys::runner::DEFAULT_ENTRY.to_string()),
        };
        if exe_dir.join(entry).is_file() {
            return exe_dir.to_path_buf();
        }
    }
    cwd.to_path_buf()
}

/// `STLAUNCH_ENTRY` from `<dir>/.env`, read without touching the process environment.
fn dotenv_entry(dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(dir.join(".env")).ok()?;
    parse_dotenv(&content)
        .into_iter()
        .rev()
        .find(|(key, value)| key == env_keys::runner::STLAUNCH_ENTRY && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_string())
}

/// Resolve the app directory from process state and make it the current directory.
pub fn enter_app_dir(explicit: Option<&Path>, entry: Option<&str>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Read current directory")?;
    let from_env = std::env::var(env_keys::app::STLAUNCH_APP_DIR).ok();
    let entry_from_env = std::env::var(env_keys::runner::STLAUNCH_ENTRY)
        .ok()
        .filter(|s| !s.trim().is_empty());
    let entry = entry.or(entry_from_env.as_deref());
    let exe = std::env::current_exe().ok();

    let dir = resolve_app_dir(explicit, from_env.as_deref(), exe.as_deref(), entry, &cwd);
    let dir = dir
        .canonicalize()
        .with_context(|| format!("App directory {} not found", dir.display()))?;
    std::env::set_current_dir(&dir)
        .with_context(|| format!("Change directory to {}", dir.display()))?;
    Ok(dir)
}
