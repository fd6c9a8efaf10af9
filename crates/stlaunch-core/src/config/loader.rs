//! Environment variable loading.
//!
//! Keeps the empty-value and boolean parsing rules in one place so callers never
//! repeat `or_else` chains.

use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Where configuration values are read from.
///
/// The process environment in production; a plain map in tests.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from `std::env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped, `export ` prefixes are accepted,
/// matching single or double quotes are stripped and an unquoted ` # ...` tail is
/// treated as a comment.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Load `<dir>/.env` into the process environment without overriding variables
/// that are already set. Returns the number of variables applied.
///
/// Must run before any thread is spawned.
pub fn load_dotenv_from_dir(dir: &Path) -> usize {
    let path = dir.join(".env");
    let Ok(content) = std::fs::read_to_string(&path) else {
        return 0;
    };
    let mut applied = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var_os(&key).is_none() {
            set_env_var(&key, &value);
            applied += 1;
        }
    }
    tracing::debug!(path = %path.display(), applied, "loaded .env");
    applied
}

/// Read a variable, falling back to `default` when unset or empty.
pub fn env_or<S, F>(src: &S, key: &str, default: F) -> String
where
    S: EnvSource + ?Sized,
    F: FnOnce() -> String,
{
    src.get(key)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default)
}

/// Read a variable as `Option` (empty values count as unset).
pub fn env_optional<S: EnvSource + ?Sized>(src: &S, key: &str) -> Option<String> {
    src.get(key).and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Parse a boolean variable: `0/false/no/off` are false, anything else set is true.
pub fn env_bool<S: EnvSource + ?Sized>(src: &S, key: &str, default: bool) -> bool {
    match src.get(key).as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

// All writes to the process environment go through this wrapper.
// SAFETY contract: callers run it during single-threaded startup.
#[allow(unsafe_code, unused_unsafe)]
pub fn set_env_var(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}
