//! Diagnostic logging setup

use crate::output::OutputMode;
use std::env;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive, e.g. `drivetidy=trace`
pub const LOG_ENV: &str = "DRIVETIDY_LOG";

/// Filter used when `DRIVETIDY_LOG` is unset
pub fn default_filter(mode: OutputMode) -> &'static str {
    match mode {
        OutputMode::Quiet => "error",
        OutputMode::Normal => "warn",
        OutputMode::Verbose => "warn,drivetidy=info",
        OutputMode::VeryVerbose => "warn,drivetidy=debug",
    }
}

/// Install the stderr subscriber. Safe to call more than once; later calls are no-ops.
pub fn init_logger(mode: OutputMode) {
    let filter = env::var(LOG_ENV)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter(mode)));

    // A subscriber may already be installed, as in tests; keep it
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_follows_verbosity() {
        assert_eq!(default_filter(OutputMode::Quiet), "error");
        assert_eq!(default_filter(OutputMode::Normal), "warn");
        assert!(default_filter(OutputMode::Verbose).contains("drivetidy=info"));
        assert!(default_filter(OutputMode::VeryVerbose).contains("drivetidy=debug"));
    }

    #[test]
    fn test_default_filters_parse() {
        for mode in [
            OutputMode::Quiet,
            OutputMode::Normal,
            OutputMode::Verbose,
            OutputMode::VeryVerbose,
        ] {
            assert!(EnvFilter::try_new(default_filter(mode)).is_ok());
        }
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logger(OutputMode::Quiet);
        init_logger(OutputMode::Verbose);
    }
}
