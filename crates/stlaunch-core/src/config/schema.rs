//! Typed configuration grouped by concern, loaded from env with uniform fallbacks.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::env_keys::{app, observability as obv_keys, runner};
use super::loader::{env_bool, env_optional, env_or, EnvSource, ProcessEnv};

/// Errors for values present in the environment but not usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}='{value}' is not a valid port (expected 1-65535)")]
    InvalidPort { key: &'static str, value: String },

    #[error("{key}='{value}' is not a readiness mode (expected 'path' or 'probe')")]
    InvalidReadiness { key: &'static str, value: String },

    #[error("{key}='{value}' names no packages (expected a comma-separated list)")]
    EmptyPackageList { key: &'static str, value: String },
}

/// How the bootstrapper decides that no provisioning is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadinessMode {
    /// The runner command resolves on the activated search path.
    #[default]
    CommandOnPath,
    /// The environment interpreter exists and pip reports every required package installed.
    Probe,
}

impl FromStr for ReadinessMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "path" | "command" => Ok(Self::CommandOnPath),
            "probe" | "strict" => Ok(Self::Probe),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ReadinessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandOnPath => f.write_str("path"),
            Self::Probe => f.write_str("probe"),
        }
    }
}

/// Everything the bootstrap procedure and the final handoff need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub port: u16,
    pub entry: String,
    pub headless: bool,
    pub runner: String,
    pub venv_dir: String,
    pub requirements: String,
    pub fallback_packages: Vec<String>,
    /// Interpreter used to create the environment; discovered on PATH when `None`.
    pub python: Option<String>,
    pub readiness: ReadinessMode,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            port: runner::DEFAULT_PORT,
            entry: runner::DEFAULT_ENTRY.to_string(),
            headless: true,
            runner: runner::DEFAULT_RUNNER.to_string(),
            venv_dir: app::DEFAULT_VENV_DIR.to_string(),
            requirements: app::DEFAULT_REQUIREMENTS.to_string(),
            fallback_packages: app::DEFAULT_FALLBACK_PACKAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            python: None,
            readiness: ReadinessMode::default(),
        }
    }
}

impl LaunchConfig {
    /// Load from the process environment. Call after `.env` has been applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source<S: EnvSource + ?Sized>(src: &S) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match env_optional(src, runner::STLAUNCH_PORT) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(p) if p != 0 => p,
                _ => {
                    return Err(ConfigError::InvalidPort {
                        key: runner::STLAUNCH_PORT,
                        value: raw,
                    })
                }
            },
            None => defaults.port,
        };

        let readiness = match env_optional(src, app::STLAUNCH_READINESS) {
            Some(raw) => raw
                .parse::<ReadinessMode>()
                .map_err(|_| ConfigError::InvalidReadiness {
                    key: app::STLAUNCH_READINESS,
                    value: raw,
                })?,
            None => defaults.readiness,
        };

        let fallback_packages = match env_optional(src, app::STLAUNCH_FALLBACK_PACKAGES) {
            Some(raw) => {
                let packages: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                if packages.is_empty() {
                    return Err(ConfigError::EmptyPackageList {
                        key: app::STLAUNCH_FALLBACK_PACKAGES,
                        value: raw,
                    });
                }
                packages
            }
            None => defaults.fallback_packages,
        };

        Ok(Self {
            port,
            entry: env_or(src, runner::STLAUNCH_ENTRY, || defaults.entry),
            headless: env_bool(src, runner::STLAUNCH_HEADLESS, defaults.headless),
            runner: env_or(src, runner::STLAUNCH_RUNNER, || defaults.runner),
            venv_dir: env_or(src, app::STLAUNCH_VENV_DIR, || defaults.venv_dir),
            requirements: env_or(src, app::STLAUNCH_REQUIREMENTS, || defaults.requirements),
            fallback_packages,
            python: env_optional(src, app::STLAUNCH_PYTHON),
            readiness,
        })
    }
}

/// Observability settings: quiet, log level, JSON output, audit log path.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    /// Cached after the first call; `.env` must be loaded before that.
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| Self::from_source(&ProcessEnv))
    }

    pub fn from_source<S: EnvSource + ?Sized>(src: &S) -> Self {
        Self {
            quiet: env_bool(src, obv_keys::STLAUNCH_QUIET, false),
            log_level: env_or(src, obv_keys::STLAUNCH_LOG_LEVEL, || {
                obv_keys::DEFAULT_LOG_LEVEL.to_string()
            }),
            log_json: env_bool(src, obv_keys::STLAUNCH_LOG_JSON, false),
            audit_log: env_optional(src, obv_keys::STLAUNCH_AUDIT_LOG),
        }
    }
}
