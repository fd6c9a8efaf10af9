//! Dependency source selection: the manifest file when present, the fallback set otherwise.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySource {
    /// A requirements file, passed to pip with `-r`.
    Manifest(PathBuf),
    /// Package names installed directly.
    Fallback(Vec<String>),
}

impl DependencySource {
    /// The manifest takes precedence whenever `<app_dir>/<manifest>` is a file.
    pub fn select(app_dir: &Path, manifest: &str, fallback: &[String]) -> Self {
        let path = app_dir.join(manifest);
        if path.is_file() {
            DependencySource::Manifest(path)
        } else {
            DependencySource::Fallback(fallback.to_vec())
        }
    }

    /// Arguments following `pip install`.
    pub fn install_args(&self) -> Vec<OsString> {
        match self {
            DependencySource::Manifest(path) => {
                vec![OsString::from("-r"), path.clone().into_os_string()]
            }
            DependencySource::Fallback(packages) => {
                packages.iter().map(OsString::from).collect()
            }
        }
    }

    /// Distribution names this source requires, for the strict readiness probe.
    pub fn package_names(&self) -> io::Result<Vec<String>> {
        match self {
            DependencySource::Manifest(path) => {
                let content = std::fs::read_to_string(path)?;
                Ok(parse_requirement_names(&content))
            }
            DependencySource::Fallback(packages) => Ok(packages
                .iter()
                .map(|p| requirement_name(p).to_string())
                .filter(|p| !p.is_empty())
                .collect()),
        }
    }

    /// Short label for logs and the audit trail.
    pub fn kind(&self) -> &'static str {
        match self {
            DependencySource::Manifest(_) => "manifest",
            DependencySource::Fallback(_) => "fallback",
        }
    }
}

impl fmt::Display for DependencySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencySource::Manifest(path) => write!(f, "{}", path.display()),
            DependencySource::Fallback(packages) => f.write_str(&packages.join(" ")),
        }
    }
}

/// Distribution names listed in a requirements file.
///
/// Skips blank lines, comments and option lines (`-r other.txt`, `--index-url ...`).
/// `name @ url` keeps its name, a URL or path with an `#egg=name` fragment yields that
/// name, and any other URL, path or archive is skipped since pip cannot look it up.
pub fn parse_requirement_names(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(line_name)
        .map(String::from)
        .collect()
}

fn line_name(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
        return None;
    }
    let line = match line.find(|c: char| c.is_whitespace()).map(|ws| (ws, &line[ws..])) {
        Some((ws, rest)) if rest.trim_start().starts_with('#') => &line[..ws],
        _ => line,
    };
    if let Some(pos) = line.find("#egg=") {
        let egg = &line[pos + "#egg=".len()..];
        let end = egg.find('&').unwrap_or(egg.len());
        let name = requirement_name(&egg[..end]);
        return (!name.is_empty()).then_some(name);
    }
    let name = requirement_name(line);
    if name.is_empty() || is_direct_reference(name) {
        return None;
    }
    Some(name)
}

fn is_direct_reference(name: &str) -> bool {
    name.starts_with('.')
        || name.contains(['/', '\\', ':'])
        || [".whl", ".zip", ".tar.gz", ".tgz"]
            .iter()
            .any(|ext| name.ends_with(ext))
}

/// Name part of one requirement specifier, e.g. `streamlit` for `streamlit[all]>=1.30; python_version>"3.8"`.
fn requirement_name(spec: &str) -> &str {
    let end = spec
        .find(|c: char| {
            matches!(c, '<' | '>' | '=' | '!' | '~' | '[' | ';' | '@' | ',') || c.is_whitespace()
        })
        .unwrap_or(spec.len());
    spec[..end].trim()
}
