//! Unified configuration layer.
//!
//! Every environment variable the launcher reads goes through this module so the
//! rest of the code works with typed settings instead of `std::env::var`.
//!
//! - `loader`: `.env` parsing plus `env_or` / `env_optional` / `env_bool` helpers
//! - `schema`: `LaunchConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants and their defaults

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{
    env_bool, env_optional, env_or, load_dotenv_from_dir, parse_dotenv, set_env_var, EnvSource,
    ProcessEnv,
};
pub use schema::{ConfigError, LaunchConfig, ObservabilityConfig, ReadinessMode};
