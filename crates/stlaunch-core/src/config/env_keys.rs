//! Environment variable keys.
//!
//! All keys use the `STLAUNCH_` prefix. Defaults live next to the key they belong to.

/// Application directory and bootstrap layout
pub mod app {
    pub const STLAUNCH_APP_DIR: &str = "STLAUNCH_APP_DIR";

    pub const STLAUNCH_VENV_DIR: &str = "STLAUNCH_VENV_DIR";
    pub const DEFAULT_VENV_DIR: &str = ".venv";

    pub const STLAUNCH_REQUIREMENTS: &str = "STLAUNCH_REQUIREMENTS";
    pub const DEFAULT_REQUIREMENTS: &str = "requirements.txt";

    /// Comma separated, installed when no manifest file is present.
    pub const STLAUNCH_FALLBACK_PACKAGES: &str = "STLAUNCH_FALLBACK_PACKAGES";
    pub const DEFAULT_FALLBACK_PACKAGES: &[&str] = &["streamlit", "pillow"];

    pub const STLAUNCH_PYTHON: &str = "STLAUNCH_PYTHON";

    /// `path` (runner resolvable on PATH) or `probe` (pip reports every package installed).
    pub const STLAUNCH_READINESS: &str = "STLAUNCH_READINESS";
}

/// Runner invocation
pub mod runner {
    pub const STLAUNCH_RUNNER: &str = "STLAUNCH_RUNNER";
    pub const DEFAULT_RUNNER: &str = "streamlit";

    pub const STLAUNCH_ENTRY: &str = "STLAUNCH_ENTRY";
    pub const DEFAULT_ENTRY: &str = "Home.py";

    pub const STLAUNCH_PORT: &str = "STLAUNCH_PORT";
    pub const DEFAULT_PORT: u16 = 8501;

    pub const STLAUNCH_HEADLESS: &str = "STLAUNCH_HEADLESS";
}

/// Logging and audit
pub mod observability {
    pub const STLAUNCH_QUIET: &str = "STLAUNCH_QUIET";
    pub const STLAUNCH_LOG_LEVEL: &str = "STLAUNCH_LOG_LEVEL";
    pub const DEFAULT_LOG_LEVEL: &str = "stlaunch=info";
    pub const STLAUNCH_LOG_JSON: &str = "STLAUNCH_LOG_JSON";
    pub const STLAUNCH_AUDIT_LOG: &str = "STLAUNCH_AUDIT_LOG";
}
