//! Child process seam: every external program the bootstrapper starts goes through
//! [`ProcessRunner`], so the procedure can be driven without a real Python install.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

/// One child process: program, arguments, working directory and environment changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    pub envs: Vec<(OsString, OsString)>,
    pub env_remove: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            envs: Vec::new(),
            env_remove: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Set a variable; a later value for the same key replaces the earlier one.
    pub fn env(&mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) {
        let key = key.as_ref().to_os_string();
        self.env_remove.retain(|k| *k != key);
        self.envs.retain(|(k, _)| *k != key);
        self.envs.push((key, value.as_ref().to_os_string()));
    }

    pub fn remove_env(&mut self, key: impl AsRef<OsStr>) {
        let key = key.as_ref().to_os_string();
        self.envs.retain(|(k, _)| *k != key);
        if !self.env_remove.contains(&key) {
            self.env_remove.push(key);
        }
    }

    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Shell-like one-line rendering for logs and `doctor` output.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args_lossy())
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("'{}'", part)
                } else {
                    part
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        for key in &self.env_remove {
            cmd.env_remove(key);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Runs child processes for the bootstrap procedure.
pub trait ProcessRunner {
    /// Run to completion with inherited stdio and return the exit code.
    fn run(&self, invocation: &Invocation) -> io::Result<i32>;

    /// Run with stdio discarded; true when the child exits successfully.
    fn probe(&self, invocation: &Invocation) -> io::Result<bool>;

    /// Hand the process over to `invocation`.
    ///
    /// On Unix the current image is replaced and this only returns on failure. Elsewhere
    /// the child is waited on and its exit code returned.
    fn exec(&self, invocation: &Invocation) -> io::Result<i32>;
}

/// [`ProcessRunner`] backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<i32> {
        tracing::debug!(cmd = %invocation.command_line(), cwd = %invocation.cwd.display(), "run");
        let status = invocation.to_command().status()?;
        Ok(exit_code(status))
    }

    fn probe(&self, invocation: &Invocation) -> io::Result<bool> {
        tracing::debug!(cmd = %invocation.command_line(), "probe");
        let status = invocation
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(status.success())
    }

    #[cfg(unix)]
    fn exec(&self, invocation: &Invocation) -> io::Result<i32> {
        use std::os::unix::process::CommandExt;
        tracing::debug!(cmd = %invocation.command_line(), "exec");
        Err(invocation.to_command().exec())
    }

    #[cfg(not(unix))]
    fn exec(&self, invocation: &Invocation) -> io::Result<i32> {
        tracing::debug!(cmd = %invocation.command_line(), "spawn and wait");
        let status = invocation.to_command().status()?;
        Ok(exit_code(status))
    }
}

/// Exit code of a finished child; signal deaths map to `128 + signal` like a shell.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    crate::error::EXIT_FAILURE
}
