//! Isolated Python environment handling for the launcher.
//!
//! Callers pass an application directory and a [`LaunchConfig`](stlaunch_core::config::LaunchConfig);
//! this crate detects and activates the environment, provisions it when the readiness
//! check fails, and builds the runner invocation. The handoff itself goes through
//! [`process::ProcessRunner::exec`].

pub mod activation;
pub mod bootstrap;
pub mod error;
pub mod layout;
pub mod log;
pub mod manifest;
pub mod process;
pub mod readiness;

#[cfg(test)]
mod test_support;

pub use activation::ActivatedEnv;
pub use bootstrap::{BootstrapEvent, Bootstrapper, Inspection, PreparedLaunch};
pub use error::{BootstrapError, Step};
pub use layout::VenvLayout;
pub use manifest::DependencySource;
pub use process::{Invocation, ProcessRunner, SystemRunner};
pub use readiness::Readiness;
