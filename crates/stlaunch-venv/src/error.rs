//! Bootstrap failures and the exit status each one maps to.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status a shell reports for a command it cannot find.
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;
/// Exit status a shell reports for a command it found but cannot execute.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
/// Launcher-side failure with no underlying tool status.
pub const EXIT_FAILURE: i32 = 1;

/// A child process step of the bootstrap procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateEnv,
    UpgradeInstaller,
    InstallDeps,
    Launch,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::CreateEnv => "create environment",
            Step::UpgradeInstaller => "upgrade pip",
            Step::InstallDeps => "install dependencies",
            Step::Launch => "launch runner",
        })
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("no Python interpreter found on PATH (tried: {})", .tried.join(", "))]
    InterpreterNotFound { tried: Vec<String> },

    #[error("{step}: cannot run '{}': {source}", .program.display())]
    Spawn {
        step: Step,
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{step} failed with exit code {code}")]
    StepFailed { step: Step, code: i32 },

    #[error("cannot activate environment at {}: {reason}", .path.display())]
    Activation { path: PathBuf, reason: String },
}

impl BootstrapError {
    /// Exit status the launcher reports for this failure.
    ///
    /// Child failures keep the child's own status; spawn failures use the shell's
    /// 127/126 convention.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::InterpreterNotFound { .. } => EXIT_COMMAND_NOT_FOUND,
            BootstrapError::Spawn { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => EXIT_COMMAND_NOT_FOUND,
                io::ErrorKind::PermissionDenied => EXIT_NOT_EXECUTABLE,
                _ => EXIT_FAILURE,
            },
            BootstrapError::StepFailed { code, .. } => *code,
            BootstrapError::Activation { .. } => EXIT_FAILURE,
        }
    }

    pub fn step(&self) -> Option<Step> {
        match self {
            BootstrapError::Spawn { step, .. } | BootstrapError::StepFailed { step, .. } => {
                Some(*step)
            }
            BootstrapError::InterpreterNotFound { .. } => Some(Step::CreateEnv),
            BootstrapError::Activation { .. } => None,
        }
    }
}
