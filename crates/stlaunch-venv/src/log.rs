//! Quiet-mode aware progress logging. With STLAUNCH_QUIET=1, `info_log!` is suppressed.
//! Goes through `tracing::info!` so the subscriber decides format and destination.

#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{
        if !$crate::log::is_quiet() {
            tracing::info!($($arg)*);
        }
    }};
}

pub fn is_quiet() -> bool {
    stlaunch_core::config::ObservabilityConfig::from_env().quiet
}
