//! On-disk layout of a virtual environment (`bin/` on Unix, `Scripts/` on Windows).

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenvLayout {
    root: PathBuf,
}

impl VenvLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Presence is all activation looks at; usability is the readiness check's job.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Directory holding the environment's executables.
    ///
    /// A `Scripts/` directory wins when it exists so a Windows-created environment is
    /// still found from other hosts; otherwise the platform default is used.
    pub fn bin_dir(&self) -> PathBuf {
        let scripts = self.root.join("Scripts");
        if scripts.is_dir() || (cfg!(windows) && !self.root.join("bin").is_dir()) {
            scripts
        } else {
            self.root.join("bin")
        }
    }

    /// The environment's interpreter path, whether or not it exists yet.
    pub fn interpreter(&self) -> PathBuf {
        let bin = self.bin_dir();
        if bin.ends_with("Scripts") {
            bin.join("python.exe")
        } else {
            bin.join("python")
        }
    }

    pub fn has_interpreter(&self) -> bool {
        self.interpreter().is_file()
    }
}
