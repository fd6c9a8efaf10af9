use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stlaunch_core::config::{LaunchConfig, ReadinessMode};

/// stlaunch - bootstrap a Python virtual environment and run a Streamlit app
///
/// With no subcommand, behaves like `stlaunch launch`.
#[derive(Parser, Debug)]
#[command(name = "stlaunch")]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub launch: LaunchArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare the environment if needed, then replace this process with `streamlit run`
    Launch(LaunchArgs),

    /// Prepare the environment without launching the app
    Setup {
        #[command(flatten)]
        opts: BootstrapArgs,
    },

    /// Report environment, readiness and the launch command without changing anything
    Doctor {
        #[command(flatten)]
        opts: BootstrapArgs,

        /// Output as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Remove the application's virtual environment
    Clean {
        #[command(flatten)]
        opts: BootstrapArgs,

        /// Show what would be removed without removing it
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct LaunchArgs {
    #[command(flatten)]
    pub opts: BootstrapArgs,

    /// Extra arguments passed to the runner after the fixed flags (after `--`)
    #[arg(last = true, value_name = "RUNNER_ARGS")]
    pub extra: Vec<OsString>,
}

/// Flags shared by every subcommand. Unset flags fall back to STLAUNCH_* / .env / defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct BootstrapArgs {
    /// Application directory (default: STLAUNCH_APP_DIR, the launcher's own directory
    /// when it holds the entry point, else the current directory)
    #[arg(long, value_name = "DIR")]
    pub app_dir: Option<PathBuf>,

    /// Server port passed to the runner (default: 8501)
    #[arg(long)]
    pub port: Option<u16>,

    /// Entry point script, relative to the app directory (default: Home.py)
    #[arg(long, value_name = "FILE")]
    pub entry: Option<String>,

    /// Virtual environment directory, relative to the app directory (default: .venv)
    #[arg(long, value_name = "DIR")]
    pub venv_dir: Option<String>,

    /// Interpreter used to create the environment (default: python3, then python)
    #[arg(long, value_name = "PYTHON")]
    pub python: Option<String>,

    /// Verify installed packages with pip instead of only looking for the runner on PATH
    #[arg(long)]
    pub strict: bool,

    /// Let the runner open a browser window
    #[arg(long)]
    pub no_headless: bool,
}

impl BootstrapArgs {
    /// Layer explicit flags over the env-derived configuration.
    pub fn apply(&self, config: &mut LaunchConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ref entry) = self.entry {
            config.entry = entry.clone();
        }
        if let Some(ref venv_dir) = self.venv_dir {
            config.venv_dir = venv_dir.clone();
        }
        if let Some(ref python) = self.python {
            config.python = Some(python.clone());
        }
        if self.strict {
            config.readiness = ReadinessMode::Probe;
        }
        if self.no_headless {
            config.headless = false;
        }
    }
}

impl Cli {
    /// Flags of whichever command was chosen.
    pub fn bootstrap_args(&self) -> &BootstrapArgs {
        match self.command {
            None => &self.launch.opts,
            Some(Commands::Launch(ref args)) => &args.opts,
            Some(Commands::Setup { ref opts })
            | Some(Commands::Doctor { ref opts, .. })
            | Some(Commands::Clean { ref opts, .. }) => opts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_invocation_is_launch_with_extra_args() {
        let cli = Cli::try_parse_from([
            "stlaunch",
            "--port",
            "9000",
            "--",
            "--theme.base",
            "dark",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.launch.opts.port, Some(9000));
        assert_eq!(cli.launch.extra, vec!["--theme.base", "dark"]);
    }

    #[test]
    fn test_subcommand_flags() {
        let cli =
            Cli::try_parse_from(["stlaunch", "doctor", "--json", "--strict", "--app-dir", "/srv/app"])
                .unwrap();
        match cli.command {
            Some(Commands::Doctor { ref opts, json }) => {
                assert!(json);
                assert!(opts.strict);
            }
            ref other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.bootstrap_args().app_dir, Some(PathBuf::from("/srv/app")));
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let mut config = LaunchConfig {
            port: 9100,
            ..LaunchConfig::default()
        };
        let args = BootstrapArgs {
            entry: Some("app.py".into()),
            strict: true,
            no_headless: true,
            ..BootstrapArgs::default()
        };
        args.apply(&mut config);
        assert_eq!(config.port, 9100);
        assert_eq!(config.entry, "app.py");
        assert_eq!(config.readiness, ReadinessMode::Probe);
        assert!(!config.headless);
        assert_eq!(config.venv_dir, ".venv");
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["stlaunch", "--port", "99999"]).is_err());
    }
}
