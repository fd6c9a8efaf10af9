//! Readiness: does the environment need provisioning before launch?
//!
//! `CommandOnPath` only asks whether the runner resolves on the activated search path.
//! It cannot tell a missing environment from a broken one, and a runner installed
//! outside the environment also counts as ready. `Probe` additionally requires the
//! environment interpreter and asks pip whether every required package is installed.

use std::path::{Path, PathBuf};

use stlaunch_core::config::ReadinessMode;

use crate::activation::ActivatedEnv;
use crate::layout::VenvLayout;
use crate::manifest::DependencySource;
use crate::process::{Invocation, ProcessRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready { runner: PathBuf },
    NotReady { reason: String },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }
}

/// Inputs of one readiness check.
pub struct ReadinessCheck<'a> {
    pub mode: ReadinessMode,
    pub runner_command: &'a str,
    pub layout: &'a VenvLayout,
    pub activated: &'a ActivatedEnv,
    pub source: &'a DependencySource,
    pub cwd: &'a Path,
}

impl ReadinessCheck<'_> {
    pub fn run<R: ProcessRunner + ?Sized>(&self, process: &R) -> Readiness {
        let Some(runner) = self.activated.resolve(self.runner_command, self.cwd) else {
            return Readiness::NotReady {
                reason: format!("'{}' not found on PATH", self.runner_command),
            };
        };
        match self.mode {
            ReadinessMode::CommandOnPath => Readiness::Ready { runner },
            ReadinessMode::Probe => match self.probe_packages(process) {
                Ok(()) => Readiness::Ready { runner },
                Err(reason) => Readiness::NotReady { reason },
            },
        }
    }

    fn probe_packages<R: ProcessRunner + ?Sized>(&self, process: &R) -> Result<(), String> {
        if !self.layout.has_interpreter() {
            return Err(format!(
                "no interpreter at {}",
                self.layout.interpreter().display()
            ));
        }
        let packages = self
            .source
            .package_names()
            .map_err(|e| format!("cannot read {}: {}", self.source, e))?;
        if packages.is_empty() {
            return Ok(());
        }

        let mut probe = Invocation::new(self.layout.interpreter(), self.cwd)
            .args(["-m", "pip", "show", "--quiet"])
            .args(&packages);
        self.activated.apply(&mut probe);
        match process.probe(&probe) {
            Ok(true) => Ok(()),
            Ok(false) => Err(format!("pip reports missing packages among: {}", packages.join(", "))),
            Err(e) => Err(format!("pip probe failed: {}", e)),
        }
    }
}
