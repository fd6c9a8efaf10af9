mod cli;
mod commands;
mod observability;
mod workdir;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use stlaunch_core::config::{self, LaunchConfig};
use stlaunch_venv::error::EXIT_FAILURE;
use stlaunch_venv::BootstrapError;

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let args = cli.bootstrap_args();
    let app_dir = workdir::enter_app_dir(args.app_dir.as_deref(), args.entry.as_deref())?;
    config::load_dotenv_from_dir(&app_dir);
    observability::init_tracing();

    let mut launch_config = LaunchConfig::from_env().context("Invalid configuration")?;
    args.apply(&mut launch_config);
    tracing::debug!(app_dir = %app_dir.display(), config = ?launch_config, "resolved configuration");

    match cli.command {
        None => commands::launch::cmd_launch(&app_dir, &launch_config, &cli.launch.extra),
        Some(Commands::Launch(ref launch)) => {
            commands::launch::cmd_launch(&app_dir, &launch_config, &launch.extra)
        }
        Some(Commands::Setup { .. }) => commands::launch::cmd_setup(&app_dir, &launch_config),
        Some(Commands::Doctor { json, .. }) => {
            commands::doctor::cmd_doctor(&app_dir, &launch_config, json)
        }
        Some(Commands::Clean { dry_run, force, .. }) => {
            commands::clean::cmd_clean(&app_dir, &launch_config.venv_dir, dry_run, force)
        }
    }
}

/// Bootstrap failures keep the failing tool's status; everything else is 1.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(bootstrap) = err.downcast_ref::<BootstrapError>() {
        return bootstrap.exit_code();
    }
    EXIT_FAILURE
}
