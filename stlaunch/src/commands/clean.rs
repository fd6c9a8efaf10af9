//! `stlaunch clean`: remove the application's virtual environment.
//!
//! The next launch then provisions a fresh one.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};

pub fn cmd_clean(app_dir: &Path, venv_dir: &str, dry_run: bool, force: bool) -> Result<i32> {
    let stdin = std::io::stdin();
    clean_venv(&app_dir.join(venv_dir), dry_run, force, &mut stdin.lock())
}

fn clean_venv(venv: &Path, dry_run: bool, force: bool, input: &mut impl BufRead) -> Result<i32> {
    if !venv.is_dir() {
        eprintln!("No environment found at {}", venv.display());
        return Ok(0);
    }

    let size = dir_size(venv);
    eprintln!("🗂  Environment {} ({})", venv.display(), format_size(size));

    if dry_run {
        eprintln!("(Dry run: nothing removed. Drop --dry-run to delete.)");
        return Ok(0);
    }

    if !force {
        eprint!("Remove this environment? [y/N] ");
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            eprintln!("Cancelled.");
            return Ok(0);
        }
    }

    fs::remove_dir_all(venv).with_context(|| format!("Remove {}", venv.display()))?;
    tracing::info!(venv = %venv.display(), freed = size, "environment removed");
    eprintln!("✓ Removed {}, freed {}", venv.display(), format_size(size));
    Ok(0)
}

/// Total size of a directory tree. Symlinks are not followed.
fn dir_size(path: &Path) -> u64 {
    let mut total: u64 = 0;
    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                total += dir_size(&entry.path());
            } else if let Ok(meta) = entry.metadata() {
                total += meta.len();
            }
        }
    }
    total
}

/// Format byte size to human-readable string.
fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
