//! Environment activation for child processes.
//!
//! Activation is computed rather than applied to the launcher itself: the search path
//! with the environment's `bin/` in front plus `VIRTUAL_ENV` are attached to every
//! [`Invocation`] that should see the environment.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::BootstrapError;
use crate::layout::VenvLayout;
use crate::process::Invocation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedEnv {
    search_path: Option<OsString>,
    virtual_env: Option<PathBuf>,
}

impl ActivatedEnv {
    /// No environment: children see the inherited search path unchanged.
    pub fn inherit(search_path: Option<OsString>) -> Self {
        Self {
            search_path,
            virtual_env: None,
        }
    }

    /// Put `layout`'s executables ahead of `inherited` on the search path.
    pub fn activate(layout: &VenvLayout, inherited: Option<&OsStr>) -> Result<Self, BootstrapError> {
        let mut dirs = vec![layout.bin_dir()];
        if let Some(inherited) = inherited {
            dirs.extend(env::split_paths(inherited));
        }
        let search_path = env::join_paths(dirs).map_err(|e| BootstrapError::Activation {
            path: layout.root().to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            search_path: Some(search_path),
            virtual_env: Some(layout.root().to_path_buf()),
        })
    }

    pub fn is_active(&self) -> bool {
        self.virtual_env.is_some()
    }

    pub fn virtual_env(&self) -> Option<&Path> {
        self.virtual_env.as_deref()
    }

    pub fn search_path(&self) -> Option<&OsStr> {
        self.search_path.as_deref()
    }

    /// Resolve `command` the way a shell with this environment activated would.
    pub fn resolve(&self, command: &str, cwd: &Path) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        which::which_in(command, Some(search_path), cwd).ok()
    }

    /// Attach this environment to a child process.
    pub fn apply(&self, invocation: &mut Invocation) {
        if let Some(ref search_path) = self.search_path {
            invocation.env("PATH", search_path);
        }
        if let Some(ref venv) = self.virtual_env {
            invocation.env("VIRTUAL_ENV", venv);
            invocation.remove_env("PYTHONHOME");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherit_does_not_touch_child_env() {
        let env = ActivatedEnv::inherit(Some(OsString::from("/usr/bin")));
        assert!(!env.is_active());
        let mut inv = Invocation::new("python3", ".");
        env.apply(&mut inv);
        assert_eq!(inv.env_value("PATH"), Some(OsStr::new("/usr/bin")));
        assert_eq!(inv.env_value("VIRTUAL_ENV"), None);
        assert!(inv.env_remove.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_activate_prepends_bin_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = VenvLayout::new(dir.path().join(".venv"));
        let env = ActivatedEnv::activate(&layout, Some(OsStr::new("/usr/bin:/bin"))).unwrap();
        assert!(env.is_active());
        let expected = format!("{}:/usr/bin:/bin", layout.bin_dir().display());
        assert_eq!(env.search_path(), Some(OsStr::new(&expected)));

        let mut inv = Invocation::new("pip", dir.path());
        env.apply(&mut inv);
        assert_eq!(inv.env_value("VIRTUAL_ENV"), Some(layout.root().as_os_str()));
        assert_eq!(inv.env_remove, vec![OsString::from("PYTHONHOME")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_prefers_environment() {
        use crate::test_support::write_executable;

        let dir = tempfile::tempdir().unwrap();
        let system_bin = dir.path().join("system");
        write_executable(&system_bin.join("streamlit"));
        let layout = VenvLayout::new(dir.path().join(".venv"));
        write_executable(&layout.bin_dir().join("streamlit"));

        let inherited = ActivatedEnv::inherit(Some(system_bin.clone().into_os_string()));
        assert_eq!(
            inherited.resolve("streamlit", dir.path()),
            Some(system_bin.join("streamlit"))
        );

        let activated = ActivatedEnv::activate(&layout, Some(system_bin.as_os_str())).unwrap();
        assert_eq!(
            activated.resolve("streamlit", dir.path()),
            Some(layout.bin_dir().join("streamlit"))
        );
        assert_eq!(activated.resolve("missing-tool", dir.path()), None);
    }

    #[test]
    fn test_resolve_without_search_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ActivatedEnv::inherit(None).resolve("streamlit", dir.path()), None);
    }
}
