//! stlaunch core: configuration shared by the environment bootstrapper and the CLI.

pub mod config;
