//! The bootstrap procedure: activate, check readiness, provision, build the runner handoff.
//!
//! ```text
//! .venv exists?  ── yes ──▶ activate
//!       │
//! readiness ok?  ── no ───▶ python -m venv .venv ▶ activate ▶ pip install --upgrade pip
//!       │                   ▶ pip install -r requirements.txt | pip install streamlit pillow
//!       ▼
//! streamlit run Home.py --server.port 8501 --server.headless true   (exec)
//! ```
//!
//! Changing into the application directory is the caller's job; everything here works on
//! the `app_dir` it is given.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use stlaunch_core::config::{LaunchConfig, ReadinessMode};

use crate::activation::ActivatedEnv;
use crate::error::{BootstrapError, Step};
use crate::info_log;
use crate::layout::VenvLayout;
use crate::manifest::DependencySource;
use crate::process::{Invocation, ProcessRunner};
use crate::readiness::{Readiness, ReadinessCheck};

/// Interpreters tried, in order, when none is configured.
const DEFAULT_INTERPRETERS: &[&str] = &["python3", "python"];

/// Something the procedure changed, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapEvent {
    EnvActivated { venv: PathBuf },
    EnvCreated { venv: PathBuf, python: PathBuf },
    InstallerUpgraded,
    DepsInstalled { source: DependencySource },
}

impl BootstrapEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BootstrapEvent::EnvActivated { .. } => "env_activated",
            BootstrapEvent::EnvCreated { .. } => "env_created",
            BootstrapEvent::InstallerUpgraded => "installer_upgraded",
            BootstrapEvent::DepsInstalled { .. } => "deps_installed",
        }
    }
}

/// Result of [`Bootstrapper::prepare`]: the environment is ready and `launch` is the handoff.
#[derive(Debug, Clone)]
pub struct PreparedLaunch {
    /// Readiness as found before any provisioning.
    pub readiness: Readiness,
    pub provisioned: bool,
    pub activated: ActivatedEnv,
    pub events: Vec<BootstrapEvent>,
    pub launch: Invocation,
}

impl PreparedLaunch {
    /// Replace the current process with the runner. Returns only on failure on Unix.
    pub fn handoff<R: ProcessRunner + ?Sized>(&self, process: &R) -> Result<i32, BootstrapError> {
        process
            .exec(&self.launch)
            .map_err(|source| BootstrapError::Spawn {
                step: Step::Launch,
                program: self.launch.program.clone(),
                source,
            })
    }
}

/// Read-only view of what `prepare` would find, for `doctor`.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub app_dir: PathBuf,
    pub layout: VenvLayout,
    pub venv_exists: bool,
    pub activated: ActivatedEnv,
    pub source: DependencySource,
    pub readiness_mode: ReadinessMode,
    pub readiness: Readiness,
    pub entry: PathBuf,
    pub entry_exists: bool,
    pub launch: Invocation,
}

pub struct Bootstrapper<'a, R: ProcessRunner + ?Sized> {
    app_dir: PathBuf,
    config: &'a LaunchConfig,
    inherited_path: Option<OsString>,
    extra_args: Vec<OsString>,
    process: &'a R,
}

impl<'a, R: ProcessRunner + ?Sized> Bootstrapper<'a, R> {
    /// Uses the launcher's own `PATH` as the inherited search path.
    pub fn new(app_dir: impl Into<PathBuf>, config: &'a LaunchConfig, process: &'a R) -> Self {
        Self {
            app_dir: app_dir.into(),
            config,
            inherited_path: env::var_os("PATH"),
            extra_args: Vec::new(),
            process,
        }
    }

    pub fn with_inherited_path(mut self, path: Option<OsString>) -> Self {
        self.inherited_path = path;
        self
    }

    /// Arguments appended to the runner command line after the fixed flags.
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn layout(&self) -> VenvLayout {
        VenvLayout::new(self.app_dir.join(&self.config.venv_dir))
    }

    pub fn dependency_source(&self) -> DependencySource {
        DependencySource::select(
            &self.app_dir,
            &self.config.requirements,
            &self.config.fallback_packages,
        )
    }

    /// Activate `layout` when its directory exists, otherwise inherit the search path.
    fn current_activation(&self, layout: &VenvLayout) -> Result<ActivatedEnv, BootstrapError> {
        if layout.exists() {
            ActivatedEnv::activate(layout, self.inherited_path.as_deref())
        } else {
            Ok(ActivatedEnv::inherit(self.inherited_path.clone()))
        }
    }

    fn check_readiness(
        &self,
        layout: &VenvLayout,
        activated: &ActivatedEnv,
        source: &DependencySource,
    ) -> Readiness {
        ReadinessCheck {
            mode: self.config.readiness,
            runner_command: &self.config.runner,
            layout,
            activated,
            source,
            cwd: &self.app_dir,
        }
        .run(self.process)
    }

    /// Everything `prepare` would look at, without creating or installing anything.
    pub fn inspect(&self) -> Result<Inspection, BootstrapError> {
        let layout = self.layout();
        let activated = self.current_activation(&layout)?;
        let source = self.dependency_source();
        let readiness = self.check_readiness(&layout, &activated, &source);
        let entry = self.app_dir.join(&self.config.entry);
        Ok(Inspection {
            app_dir: self.app_dir.clone(),
            venv_exists: layout.exists(),
            launch: self.launch_invocation(&activated),
            entry_exists: entry.is_file(),
            entry,
            readiness_mode: self.config.readiness,
            readiness,
            source,
            activated,
            layout,
        })
    }

    /// Run every step up to, but not including, the handoff.
    pub fn prepare(&self) -> Result<PreparedLaunch, BootstrapError> {
        let layout = self.layout();
        let mut events = Vec::new();

        let mut activated = self.current_activation(&layout)?;
        if activated.is_active() {
            tracing::debug!(venv = %layout.root().display(), "activated existing environment");
            events.push(BootstrapEvent::EnvActivated {
                venv: layout.root().to_path_buf(),
            });
        }

        let source = self.dependency_source();
        let readiness = self.check_readiness(&layout, &activated, &source);
        let provisioned = match readiness {
            Readiness::Ready { ref runner } => {
                tracing::debug!(runner = %runner.display(), mode = %self.config.readiness, "environment ready");
                false
            }
            Readiness::NotReady { ref reason } => {
                info_log!("Environment not ready ({}); provisioning {}", reason, layout.root().display());
                activated = self.provision(&layout, &source, &mut events)?;
                if activated.resolve(&self.config.runner, &self.app_dir).is_none() {
                    tracing::warn!(
                        runner = %self.config.runner,
                        "runner still not on PATH after provisioning"
                    );
                }
                true
            }
        };

        Ok(PreparedLaunch {
            launch: self.launch_invocation(&activated),
            readiness,
            provisioned,
            activated,
            events,
        })
    }

    /// Create the environment, activate it, upgrade pip, install dependencies.
    fn provision(
        &self,
        layout: &VenvLayout,
        source: &DependencySource,
        events: &mut Vec<BootstrapEvent>,
    ) -> Result<ActivatedEnv, BootstrapError> {
        let python = self.discover_python()?;
        let create = Invocation::new(&python, &self.app_dir)
            .args(["-m", "venv"])
            .arg(layout.root());
        info_log!("Creating environment: {}", create.command_line());
        self.run_step(Step::CreateEnv, &create)?;
        events.push(BootstrapEvent::EnvCreated {
            venv: layout.root().to_path_buf(),
            python,
        });

        let activated = ActivatedEnv::activate(layout, self.inherited_path.as_deref())?;
        events.push(BootstrapEvent::EnvActivated {
            venv: layout.root().to_path_buf(),
        });

        let mut upgrade = Invocation::new(layout.interpreter(), &self.app_dir)
            .args(["-m", "pip", "install", "--upgrade", "pip"]);
        activated.apply(&mut upgrade);
        info_log!("Upgrading pip");
        self.run_step(Step::UpgradeInstaller, &upgrade)?;
        events.push(BootstrapEvent::InstallerUpgraded);

        let mut install = Invocation::new(layout.interpreter(), &self.app_dir)
            .args(["-m", "pip", "install"])
            .args(source.install_args());
        activated.apply(&mut install);
        info_log!("Installing dependencies ({}): {}", source.kind(), source);
        self.run_step(Step::InstallDeps, &install)?;
        events.push(BootstrapEvent::DepsInstalled {
            source: source.clone(),
        });

        Ok(activated)
    }

    /// Configured interpreter, else the first of `python3` / `python` on the inherited PATH.
    fn discover_python(&self) -> Result<PathBuf, BootstrapError> {
        let candidates: Vec<&str> = match self.config.python {
            Some(ref python) => vec![python.as_str()],
            None => DEFAULT_INTERPRETERS.to_vec(),
        };
        candidates
            .iter()
            .find_map(|name| {
                which::which_in(name, self.inherited_path.as_ref(), &self.app_dir).ok()
            })
            .ok_or_else(|| BootstrapError::InterpreterNotFound {
                tried: candidates.iter().map(|s| s.to_string()).collect(),
            })
    }

    fn run_step(&self, step: Step, invocation: &Invocation) -> Result<(), BootstrapError> {
        let code = self
            .process
            .run(invocation)
            .map_err(|source| BootstrapError::Spawn {
                step,
                program: invocation.program.clone(),
                source,
            })?;
        if code != 0 {
            return Err(BootstrapError::StepFailed { step, code });
        }
        Ok(())
    }

    /// `<runner> run <entry> --server.port <port> --server.headless <bool> [extra...]`
    pub fn launch_invocation(&self, activated: &ActivatedEnv) -> Invocation {
        let program = activated
            .resolve(&self.config.runner, &self.app_dir)
            .unwrap_or_else(|| PathBuf::from(&self.config.runner));
        let mut launch = Invocation::new(program, &self.app_dir)
            .arg("run")
            .arg(&self.config.entry)
            .arg("--server.port")
            .arg(self.config.port.to_string())
            .arg("--server.headless")
            .arg(if self.config.headless { "true" } else { "false" })
            .args(&self.extra_args);
        activated.apply(&mut launch);
        launch
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }
}
