//! Test-only helpers: a recording process runner that fakes what venv and pip leave on disk.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

use crate::process::{Invocation, ProcessRunner};

/// Create an executable stub file (and its parent directories).
pub fn write_executable(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Records every invocation instead of spawning it.
///
/// `-m venv <dir>` creates `<dir>/bin/python`; a `pip install` that is not the pip
/// self-upgrade creates `<dir>/bin/<runner>` for the active `VIRTUAL_ENV`.
pub struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    execs: RefCell<Vec<Invocation>>,
    probe_result: bool,
    fail: Option<(String, i32)>,
    missing: Option<String>,
    installs_runner: Option<String>,
    exec_code: i32,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            execs: RefCell::new(Vec::new()),
            probe_result: true,
            fail: None,
            missing: None,
            installs_runner: Some("streamlit".to_string()),
            exec_code: 0,
        }
    }

    pub fn with_probe_result(mut self, ok: bool) -> Self {
        self.probe_result = ok;
        self
    }

    /// Exit with `code` for the first invocation whose command line contains `needle`.
    pub fn failing_on(mut self, needle: &str, code: i32) -> Self {
        self.fail = Some((needle.to_string(), code));
        self
    }

    /// Report `NotFound` when the program path ends with `program`.
    pub fn missing_program(mut self, program: &str) -> Self {
        self.missing = Some(program.to_string());
        self
    }

    pub fn without_runner_install(mut self) -> Self {
        self.installs_runner = None;
        self
    }

    pub fn with_exec_code(mut self, code: i32) -> Self {
        self.exec_code = code;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn execs(&self) -> Vec<Invocation> {
        self.execs.borrow().clone()
    }

    fn check_spawn(&self, invocation: &Invocation) -> io::Result<()> {
        if let Some(ref missing) = self.missing {
            if invocation.program.ends_with(missing) {
                return Err(io::Error::from(io::ErrorKind::NotFound));
            }
        }
        Ok(())
    }

    fn simulate(&self, invocation: &Invocation) {
        let args = invocation.args_lossy();
        if args.len() >= 3 && args[0] == "-m" && args[1] == "venv" {
            let root = invocation.cwd.join(&args[2]);
            write_executable(&root.join("bin").join("python"));
        }
        let is_install = args.windows(3).any(|w| w == ["-m", "pip", "install"]);
        let is_upgrade = args.iter().any(|a| a == "--upgrade");
        if is_install && !is_upgrade {
            if let (Some(runner), Some(venv)) =
                (self.installs_runner.as_ref(), invocation.env_value("VIRTUAL_ENV"))
            {
                write_executable(&PathBuf::from(venv).join("bin").join(runner));
            }
        }
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<i32> {
        self.calls.borrow_mut().push(invocation.clone());
        self.check_spawn(invocation)?;
        if let Some((ref needle, code)) = self.fail {
            if invocation.command_line().contains(needle.as_str()) {
                return Ok(code);
            }
        }
        self.simulate(invocation);
        Ok(0)
    }

    fn probe(&self, invocation: &Invocation) -> io::Result<bool> {
        self.calls.borrow_mut().push(invocation.clone());
        self.check_spawn(invocation)?;
        Ok(self.probe_result)
    }

    fn exec(&self, invocation: &Invocation) -> io::Result<i32> {
        self.execs.borrow_mut().push(invocation.clone());
        self.check_spawn(invocation)?;
        Ok(self.exec_code)
    }
}
